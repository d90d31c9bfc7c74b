//! Mock data generation
//!
//! Produces the service catalogue, the user list and the API key inventory
//! the dashboard renders. All randomness flows through a caller-supplied
//! [`rand::Rng`] and the day anchor is passed in explicitly, so a seeded
//! generator yields identical data on every run.
//!
//! # Examples
//!
//! ```
//! use apicontrol::mock_data::generate_daily_history;
//! use chrono::NaiveDate;
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
//! let mut rng = StdRng::seed_from_u64(7);
//! let history = generate_daily_history(30, 5.5, today, &mut rng)?;
//!
//! assert_eq!(history.len(), 31);
//! assert_eq!(history.last().unwrap().date.to_string(), "2024-06-30");
//! # Ok::<(), apicontrol_core::error::ApiControlError>(())
//! ```

use apicontrol_core::error::{ApiControlError, Result};
use apicontrol_core::settings::{ApiKeyEntry, KeyStatus};
use apicontrol_core::types::{
    DailyDate, DailyUsage, Platform, Provider, ServiceData, ServiceId, ServiceStatus, UserMetric,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::Rng;
use std::ops::Range;

/// Days of history generated per service by default
pub const DEFAULT_HISTORY_DAYS: u32 = 30;

/// Longest history accepted (about ten years)
pub const MAX_HISTORY_DAYS: u32 = 3650;

/// Number of mock users
pub const USER_COUNT: usize = 15;

const COST_JITTER: Range<f64> = 0.7..1.3;
const REQUEST_JITTER: Range<f64> = 0.8..1.4;
const MAX_ERROR_RATIO: f64 = 0.02;
const REQUESTS_PER_DOLLAR: f64 = 1000.0;

/// Window, in milliseconds, for a user's last activity
const LAST_ACTIVE_WINDOW_MS: i64 = 100_000_000;
const MAX_USER_SPEND: f64 = 50.0;

/// Static description of a tracked service
#[derive(Debug, Clone, Copy)]
pub struct ServiceSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub provider: Provider,
    pub status: ServiceStatus,
    /// Average daily cost in USD
    pub base_cost: f64,
    pub color: &'static str,
}

pub const SERVICE_CATALOGUE: [ServiceSpec; 3] = [
    ServiceSpec {
        id: "openai",
        name: "OpenAI (GPT-4o)",
        provider: Provider::OpenAI,
        status: ServiceStatus::Healthy,
        base_cost: 5.50,
        color: "#10a37f",
    },
    ServiceSpec {
        id: "elevenlabs",
        name: "ElevenLabs TTS",
        provider: Provider::ElevenLabs,
        status: ServiceStatus::Healthy,
        base_cost: 8.20,
        color: "#3b82f6",
    },
    ServiceSpec {
        id: "places",
        name: "Google Places API",
        provider: Provider::Google,
        status: ServiceStatus::Degraded,
        base_cost: 2.10,
        color: "#f59e0b",
    },
];

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Generate `days + 1` daily records ending at `today`, oldest first
///
/// Costs are rounded to cents and never negative for a non-negative
/// `base_cost`. Errors never exceed requests. Fails when `days` exceeds
/// [`MAX_HISTORY_DAYS`] or the window reaches before the calendar range.
pub fn generate_daily_history<R: Rng + ?Sized>(
    days: u32,
    base_cost: f64,
    today: NaiveDate,
    rng: &mut R,
) -> Result<Vec<DailyUsage>> {
    if days > MAX_HISTORY_DAYS {
        return Err(ApiControlError::InvalidArgument(format!(
            "History of {days} days exceeds the maximum of {MAX_HISTORY_DAYS}"
        )));
    }

    let base_cost = base_cost.max(0.0);
    (0..=days)
        .rev()
        .map(|offset| -> Result<DailyUsage> {
            let date = today
                .checked_sub_signed(Duration::days(i64::from(offset)))
                .ok_or_else(|| {
                    ApiControlError::InvalidArgument(format!(
                        "History of {days} days before {today} is out of range"
                    ))
                })?;
            let cost = round2(base_cost * rng.random_range(COST_JITTER));
            let requests = (cost * REQUESTS_PER_DOLLAR * rng.random_range(REQUEST_JITTER)).floor();
            let requests = requests.max(0.0) as u64;
            let errors = (requests as f64 * rng.random_range(0.0..MAX_ERROR_RATIO)).floor() as u64;
            Ok(DailyUsage {
                date: DailyDate::new(date),
                requests,
                cost,
                errors: errors.min(requests),
            })
        })
        .collect()
}

/// Build one service from its spec with a fresh history
pub fn mock_service<R: Rng + ?Sized>(
    spec: &ServiceSpec,
    days: u32,
    today: NaiveDate,
    rng: &mut R,
) -> Result<ServiceData> {
    Ok(ServiceData::new(
        ServiceId::new(spec.id),
        spec.name,
        spec.provider,
        spec.status,
        generate_daily_history(days, spec.base_cost, today, rng)?,
        spec.color,
    ))
}

/// The full service catalogue
pub fn mock_services<R: Rng + ?Sized>(
    days: u32,
    today: NaiveDate,
    rng: &mut R,
) -> Result<Vec<ServiceData>> {
    SERVICE_CATALOGUE
        .iter()
        .map(|spec| mock_service(spec, days, today, &mut *rng))
        .collect()
}

/// `count` users sorted by descending spend
pub fn mock_users<R: Rng + ?Sized>(count: usize, now: DateTime<Utc>, rng: &mut R) -> Vec<UserMetric> {
    let mut users: Vec<UserMetric> = (0..count)
        .map(|i| {
            let idle = Duration::milliseconds(rng.random_range(0..LAST_ACTIVE_WINDOW_MS));
            let platform = if rng.random_bool(0.5) {
                Platform::Android
            } else {
                Platform::Web
            };
            UserMetric {
                id: format!("user-{i}"),
                username: format!("User_{}", rng.random_range(0..10_000)),
                last_active: now - idle,
                total_spend: round2(rng.random_range(0.0..MAX_USER_SPEND)),
                platform,
            }
        })
        .collect();
    users.sort_by(|a, b| b.total_spend.total_cmp(&a.total_spend));
    users
}

/// Connected API keys shown on the settings view
pub fn mock_api_keys() -> Vec<ApiKeyEntry> {
    [
        ("OpenAI API Key", "sk-proj-****x8s9", KeyStatus::Active),
        ("ElevenLabs API Key", "2983****ks92", KeyStatus::Active),
        ("Google Places API Key", "AIza****9dk2", KeyStatus::ExpiringSoon),
    ]
    .into_iter()
    .map(|(label, masked, status)| ApiKeyEntry {
        label: label.to_string(),
        masked_value: masked.to_string(),
        status,
    })
    .collect()
}
