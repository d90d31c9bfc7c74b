//! Error types for apicontrol
//!
//! This module defines the error type shared by the apicontrol crates.
//! All variants derive from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use apicontrol_core::error::{ApiControlError, Result};
//!
//! fn parse_budget(input: &str) -> Result<f64> {
//!     input
//!         .parse::<f64>()
//!         .map_err(|_| ApiControlError::InvalidArgument(format!("Invalid budget: {input}")))
//! }
//!
//! assert!(parse_budget("abc").is_err());
//! ```

use thiserror::Error;

/// Main error type for apicontrol operations
#[derive(Error, Debug)]
pub enum ApiControlError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A view failed to render
    #[error("Render error: {0}")]
    Render(String),
}

/// Convenience type alias for Results in apicontrol
pub type Result<T> = std::result::Result<T, ApiControlError>;
