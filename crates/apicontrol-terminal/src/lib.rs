//! Terminal output formatting for apicontrol
//!
//! This crate provides the box panels, table and JSON view formatters,
//! and the markdown rendering used for AI insight text.

pub mod markdown;
pub mod output;
pub mod panels;

pub use output::{
    DashboardSnapshot, InsightPanel, JsonFormatter, OutputFormatter, TableFormatter, get_formatter,
};
pub use panels::PanelRenderer;
