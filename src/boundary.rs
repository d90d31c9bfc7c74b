//! Top-level render boundary
//!
//! Rendering a view must never take the session down. [`RenderBoundary`]
//! runs a render closure and turns both an `Err` and a panic into the
//! "Something went wrong" screen, from which `reload` recovers.

use apicontrol_core::error::Result;
use apicontrol_terminal::panels::PanelRenderer;
use serde_json::json;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::error;

/// Result of one guarded render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub output: String,
    /// The error screen replaced the view
    pub failed: bool,
}

/// Catches render failures and substitutes the error screen
pub struct RenderBoundary {
    panels: PanelRenderer,
    json: bool,
}

impl RenderBoundary {
    pub fn new(panels: PanelRenderer, json: bool) -> Self {
        Self { panels, json }
    }

    pub fn render<F>(&self, render: F) -> Rendered
    where
        F: FnOnce() -> Result<String>,
    {
        let message = match panic::catch_unwind(AssertUnwindSafe(render)) {
            Ok(Ok(output)) => {
                return Rendered {
                    output,
                    failed: false,
                };
            }
            Ok(Err(e)) => e.to_string(),
            Err(payload) => format!("Unexpected failure: {}", panic_message(payload.as_ref())),
        };

        error!("View failed to render: {}", message);
        Rendered {
            output: self.error_output(&message),
            failed: true,
        }
    }

    fn error_output(&self, message: &str) -> String {
        if self.json {
            json!({
                "error": "Something went wrong",
                "message": message,
                "action": "reload",
            })
            .to_string()
        } else {
            self.panels.error_screen(message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
