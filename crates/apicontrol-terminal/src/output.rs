//! Output formatting for the dashboard views
//!
//! Every view is rendered from a [`DashboardSnapshot`], an owned copy of the
//! state taken at render time. Two formatters are provided:
//! - [`TableFormatter`] draws box panels and tables for the terminal
//! - [`JsonFormatter`] emits the same data as pretty-printed JSON
//!
//! # Examples
//!
//! ```no_run
//! use apicontrol_terminal::output::get_formatter;
//! # fn snapshot() -> apicontrol_terminal::output::DashboardSnapshot { unimplemented!() }
//!
//! let snapshot = snapshot();
//! let formatter = get_formatter(false, true);
//! println!("{}", formatter.format_view(&snapshot));
//! ```

use crate::markdown::render_insight_markdown;
use crate::panels::{PanelRenderer, format_currency, format_number};
use apicontrol_core::aggregation_types::{
    BudgetStatus, ChartPoint, CostShare, DashboardTotals, Metric, PerformanceRow,
};
use apicontrol_core::settings::{ApiKeyEntry, BillingCycle, KeyStatus, SettingsForm};
use apicontrol_core::timezone::TimezoneConfig;
use apicontrol_core::types::{ServiceData, UserMetric, View};
use colored::*;
use prettytable::{Table, format, row};
use serde_json::{Value, json};

/// Width of the bars drawn in the analytics and settings views
const BAR_WIDTH: usize = 30;

/// State of the AI insights panel at render time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsightPanel {
    /// Last applied insight text, if any
    pub text: Option<String>,
    /// A request is in flight
    pub loading: bool,
    pub api_key_present: bool,
    /// AI calls were switched off for this session
    pub disabled: bool,
}

/// Everything a formatter needs to draw one view
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub view: View,
    pub services: Vec<ServiceData>,
    /// Users in display order (descending spend)
    pub users: Vec<UserMetric>,
    pub top_spenders: Vec<UserMetric>,
    pub totals: DashboardTotals,
    pub chart: Vec<ChartPoint>,
    pub cost_distribution: Vec<CostShare>,
    pub performance: Vec<PerformanceRow>,
    pub settings: SettingsForm,
    pub budget: BudgetStatus,
    pub api_keys: Vec<ApiKeyEntry>,
    pub insight: InsightPanel,
    /// "Saved Successfully" is showing
    pub saved_notice: bool,
    pub timezone: TimezoneConfig,
}

/// Trait for output formatters
///
/// One method per view plus the standalone insight panel. `format_view`
/// dispatches on the snapshot's current view.
pub trait OutputFormatter {
    /// Stat cards, trend chart, insights, top spenders and service cards
    fn format_overview(&self, snapshot: &DashboardSnapshot) -> String;

    /// KPIs, cost distribution, request volume and performance table
    fn format_analytics(&self, snapshot: &DashboardSnapshot) -> String;

    /// All users in state order
    fn format_users(&self, snapshot: &DashboardSnapshot) -> String;

    /// Budget, billing, API keys and notification settings
    fn format_settings(&self, snapshot: &DashboardSnapshot) -> String;

    /// Just the AI insight panel
    fn format_insight(&self, insight: &InsightPanel) -> String;

    fn format_view(&self, snapshot: &DashboardSnapshot) -> String {
        match snapshot.view {
            View::Overview => self.format_overview(snapshot),
            View::Analytics => self.format_analytics(snapshot),
            View::Users => self.format_users(snapshot),
            View::Settings => self.format_settings(snapshot),
        }
    }
}

/// Box panels and tables for human-readable terminal output
pub struct TableFormatter {
    panels: PanelRenderer,
}

impl TableFormatter {
    pub fn new(colored: bool) -> Self {
        Self {
            panels: PanelRenderer::new(colored),
        }
    }

    pub fn with_renderer(panels: PanelRenderer) -> Self {
        Self { panels }
    }

    pub fn panels(&self) -> &PanelRenderer {
        &self.panels
    }

    fn trend(metric: Metric) -> Option<(String, bool)> {
        metric
            .value()
            .map(|pct| (format!("{:.1}%", pct.abs()), pct >= 0.0))
    }

    fn new_table() -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table
    }

    fn insight_lines(&self, insight: &InsightPanel) -> Vec<String> {
        let mut lines = if insight.loading {
            vec![self.panels.dim("Analyzing usage patterns...")]
        } else if let Some(text) = &insight.text {
            render_insight_markdown(text, self.panels.colored())
        } else if insight.disabled {
            vec![self.panels.dim("AI insights are disabled for this session.")]
        } else {
            vec![self.panels.dim("No insights yet. Type 'r' to refresh.")]
        };

        if !insight.api_key_present && !insight.disabled {
            lines.push(String::new());
            lines.extend(self.panels.missing_key_banner());
        }
        lines
    }

    fn top_spenders_table(&self, users: &[UserMetric]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Top Spenders", b -> "Platform", b -> "Spend"]);
        for user in users {
            table.add_row(row![
                user.username,
                user.platform,
                r -> format_currency(user.total_spend)
            ]);
        }
        table.to_string()
    }

    fn labelled_bar(&self, label: &str, label_width: usize, percent: f64, suffix: &str) -> String {
        format!(
            "{:<label_width$}  {} {}",
            label,
            self.panels.progress_bar(percent, BAR_WIDTH),
            suffix
        )
    }
}

impl OutputFormatter for TableFormatter {
    fn format_overview(&self, snapshot: &DashboardSnapshot) -> String {
        let totals = &snapshot.totals;
        let cost_trend = Self::trend(totals.cost_trend_percent);
        let request_trend = Self::trend(totals.requests_trend_percent);

        let cards = vec![
            self.panels.stat_card(
                "Total Monthly Cost",
                &format_currency(totals.total_cost),
                cost_trend.as_ref().map(|(t, up)| (t.as_str(), *up)),
            ),
            self.panels.stat_card(
                "Total API Requests",
                &format_number(totals.total_requests),
                request_trend.as_ref().map(|(t, up)| (t.as_str(), *up)),
            ),
            self.panels
                .stat_card("Active Users", &format_number(totals.user_count as u64), None),
            self.panels.stat_card(
                "Service Health",
                &format!("{}/{}", totals.active_services, totals.service_count),
                None,
            ),
        ];

        let mut output = self.panels.header(snapshot.view);
        output.push('\n');
        output.push_str(&self.panels.section("Key Metrics", &cards));
        output.push('\n');
        output.push_str(&self.panels.section(
            "Cost Trends (Daily)",
            &self.panels.trend_chart(&snapshot.services, &snapshot.chart),
        ));
        output.push('\n');
        output.push_str(&self.format_insight(&snapshot.insight));
        output.push('\n');
        output.push_str(&self.top_spenders_table(&snapshot.top_spenders));

        let mut cards = Vec::new();
        for (i, service) in snapshot.services.iter().enumerate() {
            if i > 0 {
                cards.push(String::new());
            }
            cards.extend(self.panels.service_card(service));
        }
        output.push_str(&self.panels.section("Service Status", &cards));
        output
    }

    fn format_analytics(&self, snapshot: &DashboardSnapshot) -> String {
        let totals = &snapshot.totals;
        let avg = match totals.avg_cost_per_request {
            Metric::Available(_) => format!("${}", totals.avg_cost_per_request.format_fixed(5)),
            Metric::Unavailable => "N/A".to_string(),
        };
        let kpis = vec![
            self.panels.stat_card(
                "Projected Monthly Bill",
                &format_currency(totals.projected_cost),
                None,
            ),
            self.panels.stat_card("Avg. Cost per Request", &avg, None),
            self.panels
                .stat_card("Total Error Count", &format_number(totals.total_errors), None),
        ];

        let name_width = snapshot
            .cost_distribution
            .iter()
            .map(|s| s.name.len())
            .max()
            .unwrap_or(0);
        let distribution: Vec<String> = if snapshot.cost_distribution.is_empty() {
            vec!["No services tracked.".to_string()]
        } else {
            snapshot
                .cost_distribution
                .iter()
                .map(|share| {
                    let percent = share.share_percent.value().unwrap_or(0.0);
                    let suffix = format!(
                        "{:>6}%  {}",
                        share.share_percent.format_fixed(1),
                        format_currency(share.cost)
                    );
                    self.labelled_bar(&share.name, name_width, percent, &suffix)
                })
                .collect()
        };

        let max_requests = snapshot
            .performance
            .iter()
            .map(|p| p.requests)
            .max()
            .unwrap_or(0);
        let short_width = snapshot
            .performance
            .iter()
            .map(|p| p.short_name.len())
            .max()
            .unwrap_or(0);
        let volume: Vec<String> = snapshot
            .performance
            .iter()
            .map(|row| {
                let percent = Metric::ratio(row.requests as f64, max_requests as f64)
                    .scale(100.0)
                    .value()
                    .unwrap_or(0.0);
                let suffix = format!(
                    "{} req / {} err",
                    format_number(row.requests),
                    format_number(row.errors)
                );
                self.labelled_bar(&row.short_name, short_width, percent, &suffix)
            })
            .collect();

        let mut table = Self::new_table();
        table.set_titles(row![
            b -> "Service",
            b -> "Status",
            b -> "Requests",
            b -> "Errors",
            b -> "Error Rate",
            b -> "Cost"
        ]);
        for row in &snapshot.performance {
            let rate = match row.error_rate {
                Metric::Available(_) => format!("{}%", row.error_rate.format_fixed(2)),
                Metric::Unavailable => "N/A".to_string(),
            };
            table.add_row(row![
                row.short_name,
                self.panels.status_label(row.status),
                r -> format_number(row.requests),
                r -> format_number(row.errors),
                r -> rate,
                r -> format_currency(row.cost)
            ]);
        }

        let mut output = self.panels.header(snapshot.view);
        output.push('\n');
        output.push_str(&self.panels.section("Key Performance Indicators", &kpis));
        output.push('\n');
        output.push_str(&self.panels.section("Cost Distribution", &distribution));
        output.push('\n');
        output.push_str(&self.panels.section("Request Volume vs Errors", &volume));
        output.push('\n');
        output.push_str(&self.panels.bold("Performance Metrics"));
        output.push('\n');
        output.push_str(&table.to_string());
        output
    }

    fn format_users(&self, snapshot: &DashboardSnapshot) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![
            b -> "User",
            b -> "Platform",
            b -> "Last Active",
            b -> "Total Spend"
        ]);
        for user in &snapshot.users {
            table.add_row(row![
                user.username,
                user.platform,
                snapshot.timezone.format_timestamp(&user.last_active),
                r -> format_currency(user.total_spend)
            ]);
        }

        let mut output = self.panels.header(snapshot.view);
        output.push('\n');
        output.push_str(&table.to_string());
        output.push_str(&self.panels.dim(&format!(
            "{} users, times shown in {}",
            snapshot.users.len(),
            snapshot.timezone.display_name()
        )));
        output
    }

    fn format_settings(&self, snapshot: &DashboardSnapshot) -> String {
        let settings = &snapshot.settings;
        let budget = &snapshot.budget;
        let used = budget.used_percent.value().unwrap_or(0.0);
        let alert_percent = apicontrol_core::settings::BUDGET_ALERT_RATIO * 100.0;

        let mut budget_lines = vec![
            format!("Monthly Budget Cap: {}", format_currency(budget.budget_cap)),
            self.panels.dim(&format!(
                "We'll alert you when spending reaches {:.0}% ({}).",
                alert_percent,
                format_currency(budget.alert_threshold)
            )),
            format!(
                "Current spend: {} of {}  {} {}%",
                format_currency(budget.spend),
                format_currency(budget.budget_cap),
                self.panels.threshold_bar(used, BAR_WIDTH, alert_percent),
                budget.used_percent.format_fixed(1)
            ),
        ];
        if budget.alert_triggered {
            let warning = "! Spend has reached the alert threshold";
            budget_lines.push(if self.panels.colored() {
                warning.yellow().to_string()
            } else {
                warning.to_string()
            });
        }

        let billing: Vec<String> = BillingCycle::ALL
            .iter()
            .map(|cycle| {
                let marker = if *cycle == settings.billing_cycle {
                    "(*)"
                } else {
                    "( )"
                };
                format!("{marker} {}", cycle.label())
            })
            .collect();

        let label_width = snapshot
            .api_keys
            .iter()
            .map(|k| k.label.len())
            .max()
            .unwrap_or(0);
        let keys: Vec<String> = snapshot
            .api_keys
            .iter()
            .map(|key| {
                let status = match (self.panels.colored(), key.status) {
                    (false, status) => format!("[{status}]"),
                    (true, KeyStatus::Active) => format!("[{}]", key.status).green().to_string(),
                    (true, KeyStatus::ExpiringSoon) => {
                        format!("[{}]", key.status).yellow().to_string()
                    }
                };
                format!("{:<label_width$}  {}  {}", key.label, key.masked_value, status)
            })
            .collect();

        let toggle = |on: bool| if on { "[x]" } else { "[ ]" };
        let notifications = vec![
            format!("{} Email Alerts", toggle(settings.email_alerts)),
            format!("{} Anomaly Detection", toggle(settings.anomaly_detection)),
        ];

        let save = if snapshot.saved_notice {
            let text = "Saved Successfully";
            if self.panels.colored() {
                text.green().to_string()
            } else {
                text.to_string()
            }
        } else {
            "Save Changes (type 'save')".to_string()
        };

        let mut output = self.panels.header(snapshot.view);
        output.push('\n');
        output.push_str(&self.panels.section("Budget & Billing", &budget_lines));
        output.push('\n');
        output.push_str(&self.panels.section("Billing Cycle", &billing));
        output.push('\n');
        output.push_str(&self.panels.section("API Keys", &keys));
        output.push('\n');
        output.push_str(&self.panels.section("Notifications", &notifications));
        output.push('\n');
        output.push_str(&self.panels.line(&save));
        output
    }

    fn format_insight(&self, insight: &InsightPanel) -> String {
        self.panels
            .section("AI Insights (Gemini)", &self.insight_lines(insight))
    }
}

/// Machine-readable JSON output
pub struct JsonFormatter;

impl JsonFormatter {
    fn insight_json(insight: &InsightPanel) -> Value {
        json!({
            "text": insight.text,
            "loading": insight.loading,
            "api_key_present": insight.api_key_present,
            "disabled": insight.disabled,
        })
    }

    fn render(value: &Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize view: {}", e);
            json!({ "error": e.to_string() }).to_string()
        })
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_overview(&self, snapshot: &DashboardSnapshot) -> String {
        let output = json!({
            "view": snapshot.view,
            "totals": snapshot.totals,
            "chart": snapshot.chart.iter().map(|p| json!({
                "date": p.date.to_string(),
                "values": p.values,
            })).collect::<Vec<_>>(),
            "services": snapshot.services.iter().map(|s| json!({
                "id": s.id(),
                "name": s.name(),
                "provider": s.provider(),
                "status": s.status(),
                "total_cost_month": s.total_cost_month(),
                "total_requests_month": s.total_requests_month(),
                "color": s.color(),
            })).collect::<Vec<_>>(),
            "top_spenders": snapshot.top_spenders,
            "insight": Self::insight_json(&snapshot.insight),
        });
        Self::render(&output)
    }

    fn format_analytics(&self, snapshot: &DashboardSnapshot) -> String {
        let output = json!({
            "view": snapshot.view,
            "projected_cost": snapshot.totals.projected_cost,
            "avg_cost_per_request": snapshot.totals.avg_cost_per_request,
            "total_errors": snapshot.totals.total_errors,
            "cost_distribution": snapshot.cost_distribution,
            "performance": snapshot.performance,
        });
        Self::render(&output)
    }

    fn format_users(&self, snapshot: &DashboardSnapshot) -> String {
        let output = json!({
            "view": snapshot.view,
            "users": snapshot.users.iter().map(|u| json!({
                "id": u.id,
                "username": u.username,
                "platform": u.platform,
                "last_active": u.last_active.to_rfc3339(),
                "total_spend": u.total_spend,
            })).collect::<Vec<_>>(),
        });
        Self::render(&output)
    }

    fn format_settings(&self, snapshot: &DashboardSnapshot) -> String {
        let output = json!({
            "view": snapshot.view,
            "settings": snapshot.settings,
            "budget": snapshot.budget,
            "api_keys": snapshot.api_keys,
            "saved": snapshot.saved_notice,
        });
        Self::render(&output)
    }

    fn format_insight(&self, insight: &InsightPanel) -> String {
        Self::render(&json!({ "insight": Self::insight_json(insight) }))
    }
}

/// Pick the formatter for the requested output mode
///
/// # Examples
///
/// ```
/// use apicontrol_terminal::output::{InsightPanel, get_formatter};
///
/// let json = get_formatter(true, false);
/// assert!(json.format_insight(&InsightPanel::default()).contains("\"insight\""));
/// ```
pub fn get_formatter(json: bool, colored: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter::new(colored))
    }
}
