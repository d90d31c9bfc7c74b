//! apicontrol - Terminal dashboard for API usage, cost and error metrics
//!
//! This library provides functionality to:
//! - Generate mock usage histories for a fixed set of billed API services
//! - Aggregate costs, requests, error rates and week-over-week trends
//! - Merge per-service histories into date-keyed chart data
//! - Hold dashboard state and apply interactive commands
//! - Render views through a render boundary that survives failures
//! - Request an AI summary of the current usage
//!
//! # Examples
//!
//! ```
//! use apicontrol::app::{DashboardState, DataOptions};
//! use apicontrol::boundary::RenderBoundary;
//! use apicontrol::oneshot::render_view;
//! use apicontrol_core::timezone::TimezoneConfig;
//! use apicontrol_terminal::{PanelRenderer, get_formatter};
//! use chrono::Utc;
//!
//! let options = DataOptions { days: 30, seed: Some(42) };
//! let state = DashboardState::generate(options, TimezoneConfig::utc(), Utc::now())?
//!     .with_ai(false, false);
//!
//! let formatter = get_formatter(true, false);
//! let boundary = RenderBoundary::new(PanelRenderer::with_width(80, false), true);
//! let rendered = render_view(&state, formatter.as_ref(), &boundary);
//! assert!(!rendered.failed);
//! # Ok::<(), apicontrol::ApiControlError>(())
//! ```

pub mod aggregation;
pub mod app;
pub mod boundary;
pub mod chart;
pub mod cli;
pub mod interactive;
pub mod mock_data;
pub mod oneshot;

// Re-export commonly used types
pub use apicontrol_core::error::{ApiControlError, Result};
pub use apicontrol_core::types::{DailyDate, DailyUsage, ServiceData, UserMetric, View};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
