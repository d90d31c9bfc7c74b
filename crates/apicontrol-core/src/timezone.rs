//! Timezone handling for displayed timestamps
//!
//! The dashboard renders "last active" times and anchors generated daily
//! histories to "today" in a user-selected zone. The zone comes from
//! `--utc`, `--timezone`, the `TZ` variable, or the system setting, in that
//! order.

use crate::error::{ApiControlError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

/// Display timezone for the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneConfig {
    pub tz: Tz,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            tz: detect_local_timezone(),
        }
    }
}

impl TimezoneConfig {
    /// Always render in UTC
    pub fn utc() -> Self {
        Self { tz: Tz::UTC }
    }

    /// Resolve the zone from the `--timezone` / `--utc` flags
    pub fn from_cli(timezone: Option<&str>, use_utc: bool) -> Result<Self> {
        match (use_utc, timezone) {
            (true, _) => Ok(Self::utc()),
            (false, Some(name)) => Tz::from_str(name).map(|tz| Self { tz }).map_err(|_| {
                ApiControlError::InvalidTimezone(format!(
                    "'{name}'. Expected an IANA name such as 'Europe/Berlin' or 'UTC'"
                ))
            }),
            (false, None) => Ok(Self::default()),
        }
    }

    pub fn is_utc(&self) -> bool {
        self.tz == Tz::UTC
    }

    pub fn display_name(&self) -> &str {
        if self.is_utc() { "UTC" } else { self.tz.name() }
    }

    /// Format a UTC timestamp in the configured zone
    pub fn format_timestamp(&self, ts: &DateTime<Utc>) -> String {
        ts.with_timezone(&self.tz)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }

    /// Calendar date of `now` in the configured zone
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.tz).date_naive()
    }
}

/// Detect the local timezone, falling back to UTC
pub fn detect_local_timezone() -> Tz {
    if let Some(tz) = std::env::var("TZ").ok().and_then(|s| Tz::from_str(&s).ok()) {
        debug!("Using timezone {} from TZ", tz.name());
        return tz;
    }

    match iana_time_zone::get_timezone() {
        Ok(name) => Tz::from_str(&name).unwrap_or_else(|_| {
            debug!("Unrecognised system timezone '{}', using UTC", name);
            Tz::UTC
        }),
        Err(e) => {
            debug!("System timezone unavailable ({:?}), using UTC", e);
            Tz::UTC
        }
    }
}
