//! Common test utilities and helpers for apicontrol tests
//!
//! Seeded dashboard states, hand-built services, and a scripted text
//! generator standing in for the AI backend.

#![allow(dead_code)]

use apicontrol::app::{DashboardState, DataOptions};
use apicontrol_core::timezone::TimezoneConfig;
use apicontrol_core::types::{DailyDate, DailyUsage, Provider, ServiceData, ServiceId, ServiceStatus};
use apicontrol_insights::{AiError, TextGenerator};
use apicontrol_terminal::{PanelRenderer, TableFormatter};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fixed "now" so generated histories end on a known day
pub static FIXED_NOW: Lazy<DateTime<Utc>> =
    Lazy::new(|| Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap());

pub const TEST_SEED: u64 = 2024;

/// Dashboard state with seeded mock data and AI switched off
pub fn seeded_state() -> DashboardState {
    DashboardState::generate(
        DataOptions {
            days: 30,
            seed: Some(TEST_SEED),
        },
        TimezoneConfig::utc(),
        *FIXED_NOW,
    )
    .unwrap()
    .with_ai(false, false)
}

/// Table formatter without color at a fixed width
pub fn plain_table() -> TableFormatter {
    TableFormatter::with_renderer(PanelRenderer::with_width(100, false))
}

/// A service whose history has one entry per cost, starting 2024-06-01
pub fn service_with_costs(id: &str, costs: &[f64]) -> ServiceData {
    let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let history = costs
        .iter()
        .enumerate()
        .map(|(i, &cost)| DailyUsage {
            date: DailyDate::new(start + chrono::Duration::days(i as i64)),
            requests: (cost * 1000.0) as u64,
            cost,
            errors: 0,
        })
        .collect();
    ServiceData::new(
        ServiceId::new(id),
        format!("{id} API"),
        Provider::Other,
        ServiceStatus::Healthy,
        history,
        "#123456",
    )
}

/// Replies with a numbered text and counts calls
#[derive(Default)]
pub struct ScriptedGenerator {
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, AiError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("**Cost Efficiency:** insight #{}", call + 1))
    }
}

/// Always fails the way an unreachable network does
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, AiError> {
        Err(AiError::Status {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}
