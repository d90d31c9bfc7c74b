//! Core types, metrics and utilities for apicontrol
//!
//! This crate provides the domain types, error handling, settings state
//! and timezone configuration shared by the other apicontrol crates.

pub mod aggregation_types;
pub mod error;
pub mod settings;
pub mod timezone;
pub mod types;

// Re-export commonly used types
pub use aggregation_types::Metric;
pub use error::{ApiControlError, Result};
pub use types::{
    DailyDate, DailyUsage, Platform, Provider, ServiceData, ServiceId, ServiceStatus, UserMetric,
    View,
};
