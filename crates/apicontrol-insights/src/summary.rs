//! Condensed service summary and prompt construction
//!
//! Only the headline numbers per service go into the prompt, keeping the
//! request small and the model focused on cost and status.

use apicontrol_core::types::{ServiceData, ServiceStatus};
use serde::Serialize;

/// Number of trailing days summed into `last_7_days_cost`
pub const TRAILING_DAYS: usize = 7;

/// Per-service entry embedded in the prompt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub service: String,
    /// Monthly cost rounded to cents
    pub total_cost: String,
    pub total_requests: u64,
    pub status: ServiceStatus,
    /// Cost over the trailing week rounded to cents
    #[serde(rename = "last7DaysCost")]
    pub last_7_days_cost: String,
}

impl ServiceSummary {
    pub fn from_service(service: &ServiceData) -> Self {
        Self {
            service: service.name().to_string(),
            total_cost: format!("{:.2}", service.total_cost_month()),
            total_requests: service.total_requests_month(),
            status: service.status(),
            last_7_days_cost: format!("{:.2}", service.trailing_cost(TRAILING_DAYS)),
        }
    }
}

pub fn summarize(services: &[ServiceData]) -> Vec<ServiceSummary> {
    services.iter().map(ServiceSummary::from_service).collect()
}

/// Build the analyst instruction with the summary embedded as JSON
pub fn build_prompt(summaries: &[ServiceSummary]) -> serde_json::Result<String> {
    let data = serde_json::to_string_pretty(summaries)?;
    Ok(format!(
        "You are a Senior DevOps and FinOps dashboard analyst.
Analyze the following API consumption data for an Android App backend.

Data:
{data}

Provide a concise executive summary in markdown format with:
1. A \"Cost Efficiency\" rating (1-10) with a brief explanation.
2. Identify the biggest cost driver.
3. One specific actionable recommendation to optimize costs or performance.
4. Note any service status issues (like degraded performance).

Keep it professional, short, and visually scannable."
    ))
}
