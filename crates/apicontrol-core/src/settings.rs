//! Settings form state
//!
//! Cost-control and notification preferences edited from the settings view.
//! Nothing here is persisted; a reload restores the defaults.

use crate::error::{ApiControlError, Result};
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};

/// Default monthly budget cap in USD
pub const DEFAULT_BUDGET_CAP: f64 = 100.0;

/// Fraction of the budget cap at which an alert is sent
pub const BUDGET_ALERT_RATIO: f64 = 0.8;

/// How long the "Saved Successfully" confirmation stays visible
pub const SAVED_NOTICE_DURATION: Duration = Duration::from_secs(3);

/// Billing cycle options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    #[default]
    Monthly,
    Weekly,
    Threshold,
}

impl BillingCycle {
    pub const ALL: [BillingCycle; 3] = [Self::Monthly, Self::Weekly, Self::Threshold];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Monthly => "Monthly (1st of month)",
            Self::Weekly => "Weekly",
            Self::Threshold => "Threshold based",
        }
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for BillingCycle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "weekly" => Ok(Self::Weekly),
            "threshold" | "threshold-based" => Ok(Self::Threshold),
            _ => Err(format!(
                "Invalid billing cycle: {s} (expected monthly, weekly or threshold)"
            )),
        }
    }
}

/// Lifecycle state of a connected API key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyStatus {
    Active,
    #[serde(rename = "Expiring Soon")]
    ExpiringSoon,
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::ExpiringSoon => write!(f, "Expiring Soon"),
        }
    }
}

/// A connected service key as shown on the settings page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiKeyEntry {
    pub label: String,
    /// Key with its middle masked out
    pub masked_value: String,
    pub status: KeyStatus,
}

/// Editable settings with their defaults
#[derive(Debug, Clone, Serialize)]
pub struct SettingsForm {
    pub budget_cap: f64,
    pub billing_cycle: BillingCycle,
    pub email_alerts: bool,
    pub anomaly_detection: bool,
    #[serde(skip)]
    saved_at: Option<Instant>,
}

impl Default for SettingsForm {
    fn default() -> Self {
        Self {
            budget_cap: DEFAULT_BUDGET_CAP,
            billing_cycle: BillingCycle::default(),
            email_alerts: true,
            anomaly_detection: true,
            saved_at: None,
        }
    }
}

impl SettingsForm {
    /// Set the budget cap from raw user input
    pub fn set_budget_cap_input(&mut self, input: &str) -> Result<()> {
        self.budget_cap = parse_budget_cap(input)?;
        Ok(())
    }

    /// Spend level that triggers the budget alert
    pub fn alert_threshold(&self) -> f64 {
        self.budget_cap * BUDGET_ALERT_RATIO
    }

    /// Record a save at `now`
    pub fn save(&mut self, now: Instant) {
        self.saved_at = Some(now);
    }

    /// Whether the save confirmation should still be displayed at `now`
    pub fn saved_notice_visible(&self, now: Instant) -> bool {
        self.saved_at
            .is_some_and(|at| now.saturating_duration_since(at) < SAVED_NOTICE_DURATION)
    }
}

/// Parse a budget cap, rejecting negative and non-finite amounts
pub fn parse_budget_cap(input: &str) -> Result<f64> {
    let trimmed = input.trim().trim_start_matches('$');
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(ApiControlError::InvalidArgument(format!(
            "Invalid budget cap: {input}"
        ))),
    }
}
