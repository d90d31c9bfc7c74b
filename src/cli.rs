//! CLI interface for apicontrol
//!
//! Global flags apply to every command. Without a subcommand the dashboard
//! starts interactively on a terminal and renders the overview once
//! otherwise.
//!
//! # Example
//!
//! ```bash
//! # Interactive dashboard with reproducible data
//! apicontrol --seed 42
//!
//! # One-shot analytics view as JSON
//! apicontrol analytics --json
//!
//! # Settings view with a custom budget
//! apicontrol settings --budget-cap 250 --billing-cycle weekly
//! ```

use crate::mock_data::MAX_HISTORY_DAYS;
use apicontrol_core::error::{ApiControlError, Result};
use apicontrol_core::settings::{BillingCycle, SettingsForm, parse_budget_cap};
use apicontrol_core::types::View;
use clap::{Args, Parser, Subcommand};

/// Terminal dashboard for API usage, cost and error metrics
#[derive(Parser, Debug, Clone)]
#[command(name = "apicontrol")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Only show warnings and errors, overriding RUST_LOG
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Seed for reproducible mock data
    #[arg(long, global = true, env = "APICONTROL_SEED")]
    pub seed: Option<u64>,

    /// Days of history to generate per service (at most 3650)
    #[arg(
        long,
        default_value = "30",
        global = true,
        value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_HISTORY_DAYS))
    )]
    pub days: u32,

    /// Skip the AI analysis entirely
    #[arg(long, global = true)]
    pub no_ai: bool,

    /// Gemini API key (defaults to GEMINI_API_KEY, then API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Model used for insights
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Base URL of the Generative Language API
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Timeout in seconds for the AI request
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Timezone for displayed timestamps (e.g. "America/New_York", "UTC")
    /// If not specified, uses the system's local timezone
    #[arg(long, short = 'z', global = true)]
    pub timezone: Option<String>,

    /// Use UTC for displayed timestamps (overrides --timezone)
    #[arg(long, global = true)]
    pub utc: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Render the overview once
    Overview,

    /// Render the analytics view once
    Analytics,

    /// Render the users view once
    Users,

    /// Render the settings view once
    Settings(SettingsArgs),

    /// Print only the AI summary
    Insights,

    /// Start the interactive dashboard
    Dashboard,
}

/// Initial values for the settings form
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Monthly budget cap in USD
    #[arg(long)]
    pub budget_cap: Option<String>,

    /// Billing cycle: monthly, weekly or threshold
    #[arg(long)]
    pub billing_cycle: Option<String>,

    /// Send email alerts
    #[arg(long)]
    pub email_alerts: Option<bool>,

    /// Flag unusual spend spikes
    #[arg(long)]
    pub anomaly_detection: Option<bool>,
}

impl SettingsArgs {
    /// Apply the given flags on top of the default form
    pub fn to_form(&self) -> Result<SettingsForm> {
        let mut form = SettingsForm::default();
        if let Some(cap) = &self.budget_cap {
            form.budget_cap = parse_budget_cap(cap)?;
        }
        if let Some(cycle) = &self.billing_cycle {
            form.billing_cycle = cycle
                .parse::<BillingCycle>()
                .map_err(ApiControlError::InvalidArgument)?;
        }
        if let Some(on) = self.email_alerts {
            form.email_alerts = on;
        }
        if let Some(on) = self.anomaly_detection {
            form.anomaly_detection = on;
        }
        Ok(form)
    }
}

impl Command {
    /// The view a one-shot command renders, if any
    pub fn view(&self) -> Option<View> {
        match self {
            Self::Overview => Some(View::Overview),
            Self::Analytics => Some(View::Analytics),
            Self::Users => Some(View::Users),
            Self::Settings(_) => Some(View::Settings),
            Self::Insights | Self::Dashboard => None,
        }
    }
}
