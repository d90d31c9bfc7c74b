//! Dashboard state container
//!
//! [`DashboardState`] owns everything the views render: the generated
//! services and users, the settings form, the current view and the AI
//! insight. It changes only through `navigate`, `apply_command`, `reload`
//! and the insight entry points, and is rendered through an owned
//! [`DashboardSnapshot`].

use crate::aggregation::{Aggregator, TOP_SPENDER_COUNT};
use crate::chart::merge_histories;
use crate::mock_data::{DEFAULT_HISTORY_DAYS, USER_COUNT, mock_api_keys, mock_services, mock_users};
use apicontrol_core::error::{ApiControlError, Result};
use apicontrol_core::settings::{ApiKeyEntry, BillingCycle, SettingsForm};
use apicontrol_core::timezone::TimezoneConfig;
use apicontrol_core::types::{ServiceData, UserMetric, View};
use apicontrol_terminal::output::{DashboardSnapshot, InsightPanel};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info};

/// How mock data is generated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataOptions {
    pub days: u32,
    /// Fixed seed for reproducible data
    pub seed: Option<u64>,
}

impl Default for DataOptions {
    fn default() -> Self {
        Self {
            days: DEFAULT_HISTORY_DAYS,
            seed: None,
        }
    }
}

impl DataOptions {
    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

/// Last-write-wins holder for AI insight text
///
/// Every request takes a sequence number from [`begin`](Self::begin). A
/// completion is applied only if it is newer than the last applied one,
/// so a slow early response never overwrites a later one.
///
/// # Examples
/// ```
/// use apicontrol::app::InsightState;
///
/// let mut insight = InsightState::default();
/// let first = insight.begin();
/// let second = insight.begin();
/// assert!(insight.complete(second, "new".to_string()));
/// assert!(!insight.complete(first, "stale".to_string()));
/// assert_eq!(insight.text(), Some("new"));
/// assert!(!insight.loading());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsightState {
    issued: u64,
    applied: u64,
    text: Option<String>,
}

impl InsightState {
    /// Start a request and return its sequence number
    pub fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Apply the result of request `seq`; returns whether it was applied
    pub fn complete(&mut self, seq: u64, text: String) -> bool {
        if seq <= self.applied || seq > self.issued {
            debug!("Dropping stale insight #{} (applied #{})", seq, self.applied);
            return false;
        }
        self.applied = seq;
        self.text = Some(text);
        true
    }

    /// Some request newer than the applied one is still outstanding
    pub fn loading(&self) -> bool {
        self.issued > self.applied
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Forget the text and drop every outstanding request
    pub fn invalidate(&mut self) {
        self.applied = self.issued;
        self.text = None;
    }
}

/// A parsed interactive command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Navigate(View),
    Refresh,
    Reload,
    Budget(String),
    Cycle(BillingCycle),
    Alerts(bool),
    Anomaly(bool),
    Save,
    Help,
    Quit,
}

fn parse_toggle(value: Option<&str>, name: &str) -> Result<bool> {
    match value.map(str::to_lowercase).as_deref() {
        Some("on" | "true" | "yes") => Ok(true),
        Some("off" | "false" | "no") => Ok(false),
        _ => Err(ApiControlError::InvalidArgument(format!(
            "Usage: {name} on|off"
        ))),
    }
}

impl FromStr for Command {
    type Err = ApiControlError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let Some(head) = parts.next() else {
            return Err(ApiControlError::InvalidArgument("Empty command".to_string()));
        };
        let arg = parts.next();

        let command = match head.to_lowercase().as_str() {
            "r" | "refresh" => Self::Refresh,
            "reload" => Self::Reload,
            "save" => Self::Save,
            "help" | "?" => Self::Help,
            "q" | "quit" | "exit" => Self::Quit,
            "budget" => match arg {
                Some(amount) => Self::Budget(amount.to_string()),
                None => {
                    return Err(ApiControlError::InvalidArgument(
                        "Usage: budget <amount>".to_string(),
                    ));
                }
            },
            "cycle" => {
                let cycle = arg
                    .ok_or_else(|| "Usage: cycle monthly|weekly|threshold".to_string())
                    .and_then(BillingCycle::from_str)
                    .map_err(ApiControlError::InvalidArgument)?;
                Self::Cycle(cycle)
            }
            "alerts" => Self::Alerts(parse_toggle(arg, "alerts")?),
            "anomaly" => Self::Anomaly(parse_toggle(arg, "anomaly")?),
            other => Self::Navigate(View::from_str(other).map_err(|_| {
                ApiControlError::InvalidArgument(format!(
                    "Unknown command: {other} (type 'help' for a list)"
                ))
            })?),
        };
        Ok(command)
    }
}

/// What the caller should do after a command was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Redraw,
    /// Settings were saved; the confirmation is showing
    Saved,
    /// Redraw and start a new insight request
    RequestInsight,
    Help,
    Quit,
}

/// Everything the dashboard shows, owned by a single loop
#[derive(Debug, Clone)]
pub struct DashboardState {
    view: View,
    services: Vec<ServiceData>,
    users: Vec<UserMetric>,
    api_keys: Vec<ApiKeyEntry>,
    settings: SettingsForm,
    insight: InsightState,
    timezone: TimezoneConfig,
    options: DataOptions,
    api_key_present: bool,
    ai_enabled: bool,
}

impl DashboardState {
    /// Generate fresh data anchored at `now`
    ///
    /// Fails when the requested history does not fit the calendar.
    pub fn generate(
        options: DataOptions,
        timezone: TimezoneConfig,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let mut rng = options.rng();
        let mut state = Self {
            view: View::default(),
            services: Vec::new(),
            users: Vec::new(),
            api_keys: mock_api_keys(),
            settings: SettingsForm::default(),
            insight: InsightState::default(),
            timezone,
            options,
            api_key_present: false,
            ai_enabled: true,
        };
        state.fill(now, &mut rng)?;
        Ok(state)
    }

    /// Build a state from existing data
    pub fn from_parts(
        services: Vec<ServiceData>,
        users: Vec<UserMetric>,
        timezone: TimezoneConfig,
    ) -> Self {
        Self {
            view: View::default(),
            services,
            users,
            api_keys: mock_api_keys(),
            settings: SettingsForm::default(),
            insight: InsightState::default(),
            timezone,
            options: DataOptions::default(),
            api_key_present: false,
            ai_enabled: true,
        }
    }

    /// Replace services and users; leaves both untouched on failure
    fn fill<R: Rng + ?Sized>(&mut self, now: DateTime<Utc>, rng: &mut R) -> Result<()> {
        let today = self.timezone.today(now);
        self.services = mock_services(self.options.days, today, rng)?;
        self.users = mock_users(USER_COUNT, now, rng);
        info!(
            "Generated {} services and {} users ending {}",
            self.services.len(),
            self.users.len(),
            today
        );
        Ok(())
    }

    pub fn with_ai(mut self, enabled: bool, api_key_present: bool) -> Self {
        self.ai_enabled = enabled;
        self.api_key_present = api_key_present;
        self
    }

    pub fn with_settings(mut self, settings: SettingsForm) -> Self {
        self.settings = settings;
        self
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn services(&self) -> &[ServiceData] {
        &self.services
    }

    pub fn users(&self) -> &[UserMetric] {
        &self.users
    }

    pub fn settings(&self) -> &SettingsForm {
        &self.settings
    }

    pub fn insight(&self) -> &InsightState {
        &self.insight
    }

    pub fn ai_enabled(&self) -> bool {
        self.ai_enabled
    }

    pub fn navigate(&mut self, view: View) {
        debug!("Navigating to {}", view.label());
        self.view = view;
    }

    pub fn begin_insight(&mut self) -> u64 {
        self.insight.begin()
    }

    pub fn complete_insight(&mut self, seq: u64, text: String) -> bool {
        self.insight.complete(seq, text)
    }

    /// Regenerate all data and reset the view, settings and insight
    pub fn reload(&mut self, now: DateTime<Utc>) -> Result<()> {
        info!("Reloading dashboard state");
        let mut rng = self.options.rng();
        self.fill(now, &mut rng)?;
        self.view = View::default();
        self.settings = SettingsForm::default();
        self.insight.invalidate();
        Ok(())
    }

    /// Apply one interactive command
    ///
    /// Invalid input is returned as an error and leaves the state unchanged.
    pub fn apply_command(
        &mut self,
        command: Command,
        now: DateTime<Utc>,
        clock: Instant,
    ) -> Result<CommandOutcome> {
        let outcome = match command {
            Command::Navigate(view) => {
                self.navigate(view);
                CommandOutcome::Redraw
            }
            Command::Refresh if self.ai_enabled => CommandOutcome::RequestInsight,
            Command::Refresh => {
                return Err(ApiControlError::InvalidArgument(
                    "AI insights are disabled (--no-ai)".to_string(),
                ));
            }
            Command::Reload => {
                self.reload(now)?;
                if self.ai_enabled {
                    CommandOutcome::RequestInsight
                } else {
                    CommandOutcome::Redraw
                }
            }
            Command::Budget(input) => {
                self.settings.set_budget_cap_input(&input)?;
                CommandOutcome::Redraw
            }
            Command::Cycle(cycle) => {
                self.settings.billing_cycle = cycle;
                CommandOutcome::Redraw
            }
            Command::Alerts(on) => {
                self.settings.email_alerts = on;
                CommandOutcome::Redraw
            }
            Command::Anomaly(on) => {
                self.settings.anomaly_detection = on;
                CommandOutcome::Redraw
            }
            Command::Save => {
                self.settings.save(clock);
                info!(
                    "Settings saved: budget {:.2}, cycle {}",
                    self.settings.budget_cap,
                    self.settings.billing_cycle.label()
                );
                CommandOutcome::Saved
            }
            Command::Help => CommandOutcome::Help,
            Command::Quit => CommandOutcome::Quit,
        };
        Ok(outcome)
    }

    fn check_consistency(&self) -> Result<()> {
        for service in &self.services {
            for day in service.daily_history() {
                if !day.cost.is_finite() || day.cost < 0.0 || day.errors > day.requests {
                    return Err(ApiControlError::Render(format!(
                        "Inconsistent usage for {} on {}",
                        service.id(),
                        day.date
                    )));
                }
            }
        }
        Ok(())
    }

    /// Owned copy of everything the current view needs
    ///
    /// Fails when the usage data breaks its invariants.
    pub fn snapshot(&self, clock: Instant) -> Result<DashboardSnapshot> {
        self.check_consistency()?;

        let totals = Aggregator::dashboard_totals(&self.services, &self.users);
        let budget = Aggregator::budget_status(totals.total_cost, &self.settings);
        Ok(DashboardSnapshot {
            view: self.view,
            services: self.services.clone(),
            users: self.users.clone(),
            top_spenders: Aggregator::top_spenders(&self.users, TOP_SPENDER_COUNT),
            chart: merge_histories(&self.services),
            cost_distribution: Aggregator::cost_distribution(&self.services),
            performance: Aggregator::performance_rows(&self.services),
            totals,
            settings: self.settings.clone(),
            budget,
            api_keys: self.api_keys.clone(),
            insight: self.insight_panel(),
            saved_notice: self.settings.saved_notice_visible(clock),
            timezone: self.timezone,
        })
    }

    pub fn insight_panel(&self) -> InsightPanel {
        InsightPanel {
            text: self.insight.text().map(str::to_string),
            loading: self.insight.loading(),
            api_key_present: self.api_key_present,
            disabled: !self.ai_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 10, 9, 30, 0).unwrap()
    }

    fn seeded() -> DashboardState {
        DashboardState::generate(
            DataOptions {
                days: 30,
                seed: Some(11),
            },
            TimezoneConfig::utc(),
            now(),
        )
        .unwrap()
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!("2".parse::<Command>().unwrap(), Command::Navigate(View::Analytics));
        assert_eq!(
            "Settings".parse::<Command>().unwrap(),
            Command::Navigate(View::Settings)
        );
        assert_eq!("r".parse::<Command>().unwrap(), Command::Refresh);
        assert_eq!(
            "budget $250".parse::<Command>().unwrap(),
            Command::Budget("$250".to_string())
        );
        assert_eq!(
            "cycle weekly".parse::<Command>().unwrap(),
            Command::Cycle(BillingCycle::Weekly)
        );
        assert_eq!("alerts off".parse::<Command>().unwrap(), Command::Alerts(false));
        assert!("alerts maybe".parse::<Command>().is_err());
        assert!("budget".parse::<Command>().is_err());
        assert!("cycle yearly".parse::<Command>().is_err());
        assert!("launch".parse::<Command>().is_err());
        assert!("   ".parse::<Command>().is_err());
    }

    #[test]
    fn test_generate_rejects_oversized_history() {
        let options = DataOptions {
            days: 100_000_000,
            seed: Some(1),
        };
        let err = DashboardState::generate(options, TimezoneConfig::utc(), now()).unwrap_err();
        assert!(matches!(err, ApiControlError::InvalidArgument(_)));
    }

    #[test]
    fn test_navigation_reaches_every_view() {
        let mut state = seeded();
        for view in View::ALL {
            state.navigate(view);
            assert_eq!(state.view(), view);
            assert_eq!(state.snapshot(Instant::now()).unwrap().view, view);
        }
    }

    #[test]
    fn test_insight_last_write_wins() {
        let mut insight = InsightState::default();
        let a = insight.begin();
        let b = insight.begin();
        assert!(insight.loading());
        assert!(insight.complete(b, "b".to_string()));
        assert!(!insight.loading());
        assert!(!insight.complete(a, "a".to_string()));
        assert_eq!(insight.text(), Some("b"));
    }

    #[test]
    fn test_insight_in_order_completion() {
        let mut insight = InsightState::default();
        let a = insight.begin();
        let b = insight.begin();
        assert!(insight.complete(a, "a".to_string()));
        assert!(insight.loading());
        assert!(insight.complete(b, "b".to_string()));
        assert_eq!(insight.text(), Some("b"));
    }

    #[test]
    fn test_insight_unknown_sequence_rejected() {
        let mut insight = InsightState::default();
        assert!(!insight.complete(1, "never issued".to_string()));
        assert_eq!(insight.text(), None);
    }

    #[test]
    fn test_reload_drops_inflight_insight() {
        let mut state = seeded();
        let seq = state.begin_insight();
        state.navigate(View::Users);
        state.reload(now()).unwrap();
        assert!(!state.complete_insight(seq, "old".to_string()));
        assert_eq!(state.view(), View::Overview);
        assert!(!state.insight().loading());
    }

    #[test]
    fn test_seeded_reload_regenerates_same_data() {
        let mut state = seeded();
        let before = state.services().to_vec();
        state.reload(now()).unwrap();
        assert_eq!(state.services(), before.as_slice());
        assert_eq!(state.users().len(), USER_COUNT);
    }

    #[test]
    fn test_settings_commands() {
        let mut state = seeded();
        let clock = Instant::now();
        state
            .apply_command(Command::Budget("250".to_string()), now(), clock)
            .unwrap();
        assert_eq!(state.settings().budget_cap, 250.0);

        let err = state.apply_command(Command::Budget("-5".to_string()), now(), clock);
        assert!(err.is_err());
        assert_eq!(state.settings().budget_cap, 250.0);

        state
            .apply_command(Command::Anomaly(false), now(), clock)
            .unwrap();
        assert!(!state.settings().anomaly_detection);

        let outcome = state.apply_command(Command::Save, now(), clock).unwrap();
        assert_eq!(outcome, CommandOutcome::Saved);
        assert!(state.snapshot(clock).unwrap().saved_notice);
        let later = clock + Duration::from_secs(4);
        assert!(!state.snapshot(later).unwrap().saved_notice);
    }

    #[test]
    fn test_refresh_requires_ai() {
        let mut state = seeded();
        let outcome = state
            .apply_command(Command::Refresh, now(), Instant::now())
            .unwrap();
        assert_eq!(outcome, CommandOutcome::RequestInsight);

        let mut state = seeded().with_ai(false, false);
        assert!(
            state
                .apply_command(Command::Refresh, now(), Instant::now())
                .is_err()
        );
        assert!(state.insight_panel().disabled);
    }

    #[test]
    fn test_snapshot_rejects_inconsistent_history() {
        use apicontrol_core::types::{
            DailyDate, DailyUsage, Provider, ServiceId, ServiceStatus,
        };
        let broken = ServiceData::new(
            ServiceId::new("broken"),
            "Broken",
            Provider::Other,
            ServiceStatus::Down,
            vec![DailyUsage {
                date: DailyDate::new(now().date_naive()),
                requests: 1,
                cost: 1.0,
                errors: 5,
            }],
            "#000",
        );
        let state = DashboardState::from_parts(vec![broken], Vec::new(), TimezoneConfig::utc());
        let err = state.snapshot(Instant::now()).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }
}
