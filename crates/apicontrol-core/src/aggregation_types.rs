//! Aggregation data types for apicontrol
//!
//! Pure data structures produced by the aggregation and chart-shaping code
//! and consumed by the formatters. Nothing in here computes from services.

use crate::types::{DailyDate, ServiceId, ServiceStatus};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A derived ratio that may be undefined
///
/// Ratios with a zero denominator are `Unavailable` instead of NaN or
/// infinity. Serializes as a number or `null`.
///
/// # Examples
/// ```
/// use apicontrol_core::aggregation_types::Metric;
///
/// assert_eq!(Metric::ratio(1.0, 4.0), Metric::Available(0.25));
/// assert_eq!(Metric::ratio(1.0, 0.0), Metric::Unavailable);
/// assert_eq!(Metric::Unavailable.format_fixed(2), "N/A");
/// assert_eq!(Metric::Available(1.234).format_fixed(2), "1.23");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Available(f64),
    Unavailable,
}

impl Metric {
    /// `numerator / denominator`, unavailable when the result is not finite
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            return Self::Unavailable;
        }
        let value = numerator / denominator;
        if value.is_finite() {
            Self::Available(value)
        } else {
            Self::Unavailable
        }
    }

    /// Scale an available value, leaving `Unavailable` untouched
    pub fn scale(self, factor: f64) -> Self {
        match self {
            Self::Available(v) => Self::Available(v * factor),
            Self::Unavailable => Self::Unavailable,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Available(v) => Some(*v),
            Self::Unavailable => None,
        }
    }

    /// Fixed-precision rendering, `N/A` when unavailable
    pub fn format_fixed(&self, decimals: usize) -> String {
        match self {
            Self::Available(v) => format!("{v:.decimals$}"),
            Self::Unavailable => "N/A".to_string(),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(v) => write!(f, "{v}"),
            Self::Unavailable => write!(f, "N/A"),
        }
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Available(v) => serializer.serialize_f64(*v),
            Self::Unavailable => serializer.serialize_none(),
        }
    }
}

/// Headline numbers for the whole dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardTotals {
    /// Sum of monthly cost across services
    pub total_cost: f64,
    /// Sum of monthly requests across services
    pub total_requests: u64,
    /// Sum of errors across all service histories
    pub total_errors: u64,
    /// Services with status `healthy`
    pub active_services: usize,
    pub service_count: usize,
    pub user_count: usize,
    /// Total cost with the fixed 20% markup
    pub projected_cost: f64,
    pub avg_cost_per_request: Metric,
    /// Week-over-week change in cost, in percent
    pub cost_trend_percent: Metric,
    /// Week-over-week change in requests, in percent
    pub requests_trend_percent: Metric,
}

/// One slice of the cost distribution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostShare {
    pub id: ServiceId,
    pub name: String,
    pub cost: f64,
    /// Percentage of total cost, unavailable when total cost is zero
    pub share_percent: Metric,
    pub color: String,
}

/// Reliability row for one service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceRow {
    pub id: ServiceId,
    pub short_name: String,
    pub status: ServiceStatus,
    pub requests: u64,
    pub errors: u64,
    /// Errors as a percentage of requests
    pub error_rate: Metric,
    pub cost: f64,
}

/// Merged chart record for a single day
///
/// `values` holds one cost per service id that has data for `date`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: DailyDate,
    pub values: BTreeMap<ServiceId, f64>,
}

impl ChartPoint {
    pub fn value_for(&self, id: &ServiceId) -> Option<f64> {
        self.values.get(id).copied()
    }
}

/// Spend measured against the configured budget cap
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub budget_cap: f64,
    pub spend: f64,
    /// Spend as a percentage of the cap
    pub used_percent: Metric,
    /// Spend level at which an alert is raised
    pub alert_threshold: f64,
    pub alert_triggered: bool,
}
