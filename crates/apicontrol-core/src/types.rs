//! Core domain types for apicontrol
//!
//! This module contains the entities the dashboard renders: per-day usage
//! records, tracked services and per-user spend. Derived totals on
//! [`ServiceData`] are computed once by its constructor and exposed through
//! accessors, so they always match the daily history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strongly-typed service identifier
///
/// Used as the key for chart series and for joining per-service rows.
///
/// # Examples
/// ```
/// use apicontrol_core::types::ServiceId;
///
/// let id = ServiceId::new("openai");
/// assert_eq!(id.as_str(), "openai");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceId(String);

impl ServiceId {
    /// Create a new ServiceId from any string-like type
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ServiceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Calendar day a usage record belongs to
///
/// # Examples
/// ```
/// use apicontrol_core::types::DailyDate;
/// use chrono::NaiveDate;
///
/// let date = DailyDate::new(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
/// assert_eq!(date.format("%Y-%m-%d"), "2024-01-15");
/// assert_eq!(date.format("%-d"), "15");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DailyDate(NaiveDate);

impl DailyDate {
    /// Create a new DailyDate
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Get the inner NaiveDate
    pub fn inner(&self) -> &NaiveDate {
        &self.0
    }

    /// Format with a chrono format string
    pub fn format(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }
}

impl fmt::Display for DailyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Billing provider behind a tracked service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    OpenAI,
    ElevenLabs,
    Google,
    Other,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAI => write!(f, "OpenAI"),
            Self::ElevenLabs => write!(f, "ElevenLabs"),
            Self::Google => write!(f, "Google"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// Operational status of a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
    Down,
}

impl ServiceStatus {
    /// Human-facing label shown on service cards
    pub fn label(&self) -> &'static str {
        match self {
            Self::Healthy => "Operational",
            Self::Degraded => "Degraded",
            Self::Down => "Outage",
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded => write!(f, "degraded"),
            Self::Down => write!(f, "down"),
        }
    }
}

/// Client platform a user is active on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Android,
    #[serde(rename = "iOS")]
    Ios,
    Web,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Android => write!(f, "Android"),
            Self::Ios => write!(f, "iOS"),
            Self::Web => write!(f, "Web"),
        }
    }
}

/// Usage for a single service on a single day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyUsage {
    /// Day of usage
    pub date: DailyDate,
    /// Requests served
    pub requests: u64,
    /// Cost for the day in USD
    pub cost: f64,
    /// Failed requests, never more than `requests`
    pub errors: u64,
}

/// A tracked, billed API service with its daily history
///
/// The monthly totals are derived from `daily_history` when the value is
/// built and cannot be set independently.
///
/// # Examples
/// ```
/// use apicontrol_core::types::{
///     DailyDate, DailyUsage, Provider, ServiceData, ServiceId, ServiceStatus,
/// };
/// use chrono::NaiveDate;
///
/// let day = |d, cost, requests| DailyUsage {
///     date: DailyDate::new(NaiveDate::from_ymd_opt(2024, 1, d).unwrap()),
///     requests,
///     cost,
///     errors: 0,
/// };
/// let service = ServiceData::new(
///     ServiceId::new("openai"),
///     "OpenAI (GPT-4o)",
///     Provider::OpenAI,
///     ServiceStatus::Healthy,
///     vec![day(1, 1.25, 1000), day(2, 2.50, 2000)],
///     "#10a37f",
/// );
/// assert_eq!(service.total_requests_month(), 3000);
/// assert!((service.total_cost_month() - 3.75).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceData {
    id: ServiceId,
    name: String,
    provider: Provider,
    status: ServiceStatus,
    total_cost_month: f64,
    total_requests_month: u64,
    daily_history: Vec<DailyUsage>,
    color: String,
}

impl ServiceData {
    /// Build a service, deriving its monthly totals from the history
    pub fn new(
        id: ServiceId,
        name: impl Into<String>,
        provider: Provider,
        status: ServiceStatus,
        daily_history: Vec<DailyUsage>,
        color: impl Into<String>,
    ) -> Self {
        let total_cost_month = daily_history.iter().map(|d| d.cost).sum();
        let total_requests_month = daily_history.iter().map(|d| d.requests).sum();
        Self {
            id,
            name: name.into(),
            provider,
            status,
            total_cost_month,
            total_requests_month,
            daily_history,
            color: color.into(),
        }
    }

    pub fn id(&self) -> &ServiceId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// First word of the name, used as a compact chart label
    pub fn short_name(&self) -> &str {
        self.name.split(' ').next().unwrap_or(&self.name)
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn status(&self) -> ServiceStatus {
        self.status
    }

    /// Sum of `cost` over the daily history
    pub fn total_cost_month(&self) -> f64 {
        self.total_cost_month
    }

    /// Sum of `requests` over the daily history
    pub fn total_requests_month(&self) -> u64 {
        self.total_requests_month
    }

    /// Sum of `errors` over the daily history
    pub fn total_errors_month(&self) -> u64 {
        self.daily_history.iter().map(|d| d.errors).sum()
    }

    pub fn daily_history(&self) -> &[DailyUsage] {
        &self.daily_history
    }

    /// Cost over the most recent `days` entries of the history
    pub fn trailing_cost(&self, days: usize) -> f64 {
        let start = self.daily_history.len().saturating_sub(days);
        self.daily_history[start..].iter().map(|d| d.cost).sum()
    }

    /// Display color tag (hex)
    pub fn color(&self) -> &str {
        &self.color
    }
}

/// Spend attributed to a single end user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMetric {
    pub id: String,
    pub username: String,
    pub last_active: DateTime<Utc>,
    /// Total spend in USD
    pub total_spend: f64,
    pub platform: Platform,
}

/// The dashboard views reachable from the navigation bar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Overview,
    Analytics,
    Users,
    Settings,
}

impl View {
    /// All views in navigation order
    pub const ALL: [View; 4] = [View::Overview, View::Analytics, View::Users, View::Settings];

    /// Page heading for the view
    pub fn title(&self) -> &'static str {
        match self {
            Self::Overview => "Dashboard Overview",
            Self::Analytics => "Detailed Analytics",
            Self::Users => "User Management",
            Self::Settings => "Platform Settings",
        }
    }

    /// Short label used in the navigation bar
    pub fn label(&self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Analytics => "Analytics",
            Self::Users => "Users",
            Self::Settings => "Settings",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "overview" | "dashboard" => Ok(Self::Overview),
            "2" | "analytics" => Ok(Self::Analytics),
            "3" | "users" => Ok(Self::Users),
            "4" | "settings" => Ok(Self::Settings),
            _ => Err(format!("Invalid view: {s}")),
        }
    }
}
