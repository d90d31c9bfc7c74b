//! One-shot rendering
//!
//! Used when stdout is not a terminal or a view subcommand is given: the
//! state is built, at most one AI request is made, and a single view or the
//! insight panel is printed.

use crate::app::DashboardState;
use crate::boundary::{RenderBoundary, Rendered};
use apicontrol_insights::{InsightClient, insight_or_fallback};
use apicontrol_terminal::output::OutputFormatter;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};
use tracing::debug;

/// Request one analysis and apply it to the state
///
/// Shows a spinner on stderr while waiting when `show_progress` is set.
pub async fn fetch_insight(state: &mut DashboardState, client: &InsightClient, show_progress: bool) {
    let seq = state.begin_insight();

    let spinner = if show_progress {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message("Analyzing usage patterns...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let text = insight_or_fallback(client.analyze(state.services()).await);

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    if !state.complete_insight(seq, text) {
        debug!("Insight #{} was superseded", seq);
    }
}

/// Render the state's current view through the boundary
pub fn render_view(
    state: &DashboardState,
    formatter: &dyn OutputFormatter,
    boundary: &RenderBoundary,
) -> Rendered {
    boundary.render(|| {
        let snapshot = state.snapshot(Instant::now())?;
        Ok(formatter.format_view(&snapshot))
    })
}

/// Render only the insight panel
pub fn render_insight(state: &DashboardState, formatter: &dyn OutputFormatter) -> String {
    formatter.format_insight(&state.insight_panel())
}
