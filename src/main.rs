//! apicontrol - Terminal dashboard for API usage, cost and error metrics

use apicontrol::{
    ApiControlError, Result,
    app::{DashboardState, DataOptions},
    boundary::RenderBoundary,
    cli::{Cli, Command},
    interactive::InteractiveSession,
    oneshot::{fetch_insight, render_insight, render_view},
};
use apicontrol_core::settings::SettingsForm;
use apicontrol_core::timezone::TimezoneConfig;
use apicontrol_core::types::View;
use apicontrol_insights::{InsightClient, InsightsConfig};
use apicontrol_terminal::{PanelRenderer, get_formatter};
use chrono::Utc;
use clap::Parser;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(cli: &Cli) {
    // --quiet overrides RUST_LOG
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("warn")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if cli.verbose {
                tracing_subscriber::EnvFilter::new(
                    "apicontrol=info,apicontrol_core=info,apicontrol_insights=info",
                )
            } else {
                tracing_subscriber::EnvFilter::new("warn")
            }
        })
    };

    // Logs go to stderr so they never mix with rendered views
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn insights_config(cli: &Cli) -> InsightsConfig {
    InsightsConfig::from_env()
        .with_api_key(cli.api_key.clone())
        .with_model(cli.model.clone())
        .with_endpoint(cli.endpoint.clone())
        .with_timeout(cli.timeout.map(Duration::from_secs))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let timezone = TimezoneConfig::from_cli(cli.timezone.as_deref(), cli.utc)?;
    info!("Using timezone: {}", timezone.display_name());

    let settings = match &cli.command {
        Some(Command::Settings(args)) => args.to_form()?,
        _ => SettingsForm::default(),
    };

    let config = insights_config(&cli);
    let api_key_present = config.has_api_key();
    let client = if cli.no_ai {
        None
    } else {
        if !api_key_present {
            warn!("No Gemini API key configured; AI insights will show the fallback text");
        }
        Some(InsightClient::gemini(config).map_err(|e| ApiControlError::Config(e.to_string()))?)
    };

    let options = DataOptions {
        days: cli.days,
        seed: cli.seed,
    };
    let mut state = DashboardState::generate(options, timezone, Utc::now())?
        .with_ai(!cli.no_ai, api_key_present)
        .with_settings(settings);

    let stdout_tty = is_terminal::is_terminal(std::io::stdout());
    let colored = !cli.json && stdout_tty;
    let formatter = get_formatter(cli.json, colored);
    let boundary = RenderBoundary::new(PanelRenderer::new(colored), cli.json);

    let interactive = match &cli.command {
        Some(Command::Dashboard) => true,
        None => !cli.json && stdout_tty && is_terminal::is_terminal(std::io::stdin()),
        Some(_) => false,
    };

    if interactive {
        info!("Starting interactive dashboard");
        return InteractiveSession::new(state, formatter, boundary, client)
            .run()
            .await;
    }

    let show_progress = !cli.json && is_terminal::is_terminal(std::io::stderr());
    match &cli.command {
        Some(Command::Insights) => {
            if let Some(client) = &client {
                fetch_insight(&mut state, client, show_progress).await;
            }
            println!("{}", render_insight(&state, formatter.as_ref()));
        }
        command => {
            let view = command.as_ref().and_then(Command::view).unwrap_or(View::Overview);
            state.navigate(view);
            // Only the overview shows the insight panel
            if view == View::Overview
                && let Some(client) = &client
            {
                fetch_insight(&mut state, client, show_progress).await;
            }
            let rendered = render_view(&state, formatter.as_ref(), &boundary);
            println!("{}", rendered.output);
            if rendered.failed {
                return Err(ApiControlError::Render(
                    "view could not be rendered".to_string(),
                ));
            }
        }
    }

    Ok(())
}
