//! Box-drawn panels for the terminal dashboard
//!
//! Header and navigation bar, stat cards, service cards, the cost trend
//! chart, the AI insights panel and the error screen. Everything is plain
//! ASCII so that it survives any terminal; color is applied only when
//! enabled and `NO_COLOR` is unset.

use apicontrol_core::aggregation_types::ChartPoint;
use apicontrol_core::types::{ServiceData, ServiceStatus, View};
use colored::*;

const BOX_CORNER: &str = "+";
const BOX_HORIZONTAL: &str = "-";
const BOX_VERTICAL: &str = "|";

const PROGRESS_FULL: &str = "#";
const PROGRESS_EMPTY: &str = ".";

/// Sparkline glyphs from lowest to highest
const SPARK_LEVELS: &[char] = &['_', '.', ':', '-', '=', '+', '*', '#'];

/// Number of trailing days drawn on a service card
pub const CARD_SPARKLINE_DAYS: usize = 20;

const MIN_WIDTH: usize = 60;
const MAX_WIDTH: usize = 120;

/// Draws fixed-width boxes and the widgets inside them
#[derive(Debug, Clone)]
pub struct PanelRenderer {
    width: usize,
    colored_output: bool,
}

impl PanelRenderer {
    /// Size to the terminal, clamped to a readable range
    pub fn new(colored: bool) -> Self {
        let width = terminal_width().unwrap_or(100).clamp(MIN_WIDTH, MAX_WIDTH);
        Self::with_width(width, colored)
    }

    pub fn with_width(width: usize, colored: bool) -> Self {
        Self {
            width: width.max(MIN_WIDTH),
            colored_output: colored && std::env::var("NO_COLOR").is_err(),
        }
    }

    pub fn colored(&self) -> bool {
        self.colored_output
    }

    pub fn top(&self) -> String {
        format!(
            "{}{}{}",
            BOX_CORNER,
            BOX_HORIZONTAL.repeat(self.width - 2),
            BOX_CORNER
        )
    }

    pub fn bottom(&self) -> String {
        format!("\n{}", self.top())
    }

    pub fn separator(&self) -> String {
        format!("\n{}", self.top())
    }

    /// A line with `text` centered between the borders
    pub fn centered(&self, text: &str) -> String {
        let text_width = console::measure_text_width(text);
        let available = self.width.saturating_sub(2);
        if text_width >= available {
            return self.line(text);
        }
        let left = (available - text_width) / 2;
        let right = available - left - text_width;
        format!(
            "\n{}{}{}{}{}",
            BOX_VERTICAL,
            " ".repeat(left),
            text,
            " ".repeat(right),
            BOX_VERTICAL
        )
    }

    /// A left-aligned line, truncated to fit
    pub fn line(&self, content: &str) -> String {
        let available = self.width.saturating_sub(4);
        let truncated = console::truncate_str(content, available, "...");
        let padding = available.saturating_sub(console::measure_text_width(&truncated));
        format!(
            "\n{} {}{} {}",
            BOX_VERTICAL,
            truncated,
            " ".repeat(padding),
            BOX_VERTICAL
        )
    }

    /// A box titled `title` containing `lines`
    pub fn section(&self, title: &str, lines: &[String]) -> String {
        let mut output = self.top();
        output.push_str(&self.line(&self.bold(title)));
        output.push_str(&self.separator());
        for line in lines {
            output.push_str(&self.line(line));
        }
        output.push_str(&self.bottom());
        output
    }

    pub fn bold(&self, text: &str) -> String {
        if self.colored_output {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn dim(&self, text: &str) -> String {
        if self.colored_output {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    /// Status text colored by severity
    pub fn status_label(&self, status: ServiceStatus) -> String {
        let label = format!("[{}]", status.label());
        if !self.colored_output {
            return label;
        }
        match status {
            ServiceStatus::Healthy => label.green().to_string(),
            ServiceStatus::Degraded => label.yellow().to_string(),
            ServiceStatus::Down => label.red().to_string(),
        }
    }

    /// Page header with the navigation bar
    pub fn header(&self, current: View) -> String {
        let mut output = self.top();
        output.push_str(&self.centered("APICONTROL"));
        output.push_str(&self.separator());
        output.push_str(&self.line(&self.navigation(current)));
        output.push_str(&self.separator());
        let badge = if self.colored_output {
            "System Online".green().to_string()
        } else {
            "System Online".to_string()
        };
        output.push_str(&self.line(&format!("{}  [{}]", self.bold(current.title()), badge)));
        output.push_str(&self.line(
            "Welcome back, here's what's happening with your APIs.",
        ));
        output.push_str(&self.bottom());
        output
    }

    /// `1 Overview | 2 Analytics | ...` with the active view marked
    pub fn navigation(&self, current: View) -> String {
        View::ALL
            .iter()
            .enumerate()
            .map(|(i, view)| {
                if *view == current {
                    let item = format!("[{} {}]", i + 1, view.label());
                    if self.colored_output {
                        item.blue().bold().to_string()
                    } else {
                        item
                    }
                } else {
                    format!(" {} {} ", i + 1, view.label())
                }
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// One-line stat card: title, value and optional trend
    pub fn stat_card(&self, title: &str, value: &str, trend: Option<(&str, bool)>) -> String {
        let trend_text = match trend {
            Some((delta, up)) => {
                let arrow = if up { "^" } else { "v" };
                let text = format!("{arrow} {delta} vs prior week");
                match (self.colored_output, up) {
                    (false, _) => text,
                    (true, true) => text.green().to_string(),
                    (true, false) => text.red().to_string(),
                }
            }
            None => String::new(),
        };
        format!("{:<22} {:>16}   {}", title, self.bold(value), trend_text)
    }

    /// Card lines for a single service
    pub fn service_card(&self, service: &ServiceData) -> Vec<String> {
        let recent: Vec<Option<f64>> = {
            let history = service.daily_history();
            let start = history.len().saturating_sub(CARD_SPARKLINE_DAYS);
            history[start..].iter().map(|d| Some(d.cost)).collect()
        };
        let max = service
            .daily_history()
            .iter()
            .map(|d| d.cost)
            .fold(0.0_f64, f64::max);

        vec![
            format!(
                "{}  {}",
                self.bold(service.name()),
                self.status_label(service.status())
            ),
            self.dim(&format!("{} - {}", service.provider(), service.color())),
            format!(
                "Month Cost: {:<14} Requests: {}",
                format_currency(service.total_cost_month()),
                format_number(service.total_requests_month())
            ),
            format!("Trend: {}", sparkline(&recent, max)),
        ]
    }

    /// Per-service sparklines over the merged chart series
    pub fn trend_chart(&self, services: &[ServiceData], chart: &[ChartPoint]) -> Vec<String> {
        if services.is_empty() || chart.is_empty() {
            return vec!["Loading usage trends...".to_string()];
        }

        let max = chart
            .iter()
            .flat_map(|p| p.values.values().copied())
            .fold(0.0_f64, f64::max);
        let name_width = services
            .iter()
            .map(|s| console::measure_text_width(s.name()))
            .max()
            .unwrap_or(0);

        let mut lines = Vec::with_capacity(services.len() + 1);
        for service in services {
            let series: Vec<Option<f64>> =
                chart.iter().map(|p| p.value_for(service.id())).collect();
            lines.push(format!(
                "{:<name_width$}  {}",
                service.name(),
                sparkline(&series, max)
            ));
        }

        let first = chart.first().map(|p| p.date.format("%b %-d"));
        let last = chart.last().map(|p| p.date.format("%b %-d"));
        if let (Some(first), Some(last)) = (first, last) {
            let span = chart.len();
            let gap = span.saturating_sub(first.len() + last.len()).max(1);
            lines.push(format!(
                "{:<name_width$}  {}{}{}",
                "",
                first,
                " ".repeat(gap),
                last
            ));
        }
        lines.push(format!("Peak daily cost: {}", format_currency(max)));
        lines
    }

    /// Horizontal bar for a percentage in `0..=100`
    pub fn progress_bar(&self, percentage: f64, width: usize) -> String {
        let clamped = if percentage.is_finite() {
            percentage.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let filled = (((clamped / 100.0) * width as f64) as usize).min(width);
        format!(
            "[{}{}]",
            PROGRESS_FULL.repeat(filled),
            PROGRESS_EMPTY.repeat(width - filled)
        )
    }

    /// Progress bar colored by how close it is to a limit
    pub fn threshold_bar(&self, percentage: f64, width: usize, alert_at: f64) -> String {
        let bar = self.progress_bar(percentage, width);
        if !self.colored_output {
            return bar;
        }
        if percentage >= 100.0 {
            bar.red().to_string()
        } else if percentage >= alert_at {
            bar.yellow().to_string()
        } else {
            bar.green().to_string()
        }
    }

    /// Warning shown when no API key is configured
    pub fn missing_key_banner(&self) -> Vec<String> {
        let lines = [
            "! API Key not detected. The analysis above is a placeholder or failed.",
            "  Set GEMINI_API_KEY (or API_KEY) or pass --api-key to enable real AI insights.",
        ];
        lines
            .iter()
            .map(|line| {
                if self.colored_output {
                    line.yellow().to_string()
                } else {
                    line.to_string()
                }
            })
            .collect()
    }

    /// Full-screen replacement shown when a view fails to render
    pub fn error_screen(&self, message: &str) -> String {
        let mut output = self.top();
        let title = if self.colored_output {
            "Something went wrong".red().bold().to_string()
        } else {
            "Something went wrong".to_string()
        };
        output.push_str(&self.centered(&title));
        output.push_str(&self.separator());
        for line in message.lines() {
            output.push_str(&self.line(line));
        }
        output.push_str(&self.separator());
        output.push_str(&self.centered("Type 'reload' to reload the application"));
        output.push_str(&self.bottom());
        output
    }
}

/// ASCII sparkline scaled to `max`; missing points render as blanks
pub fn sparkline(values: &[Option<f64>], max: f64) -> String {
    let scale = if max > 0.0 { max } else { 1.0 };
    let top = SPARK_LEVELS.len() - 1;
    values
        .iter()
        .map(|value| match value {
            Some(v) => {
                let ratio = (v / scale).clamp(0.0, 1.0);
                SPARK_LEVELS[(ratio * top as f64).round() as usize]
            }
            None => ' ',
        })
        .collect()
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result
}

/// Format a USD amount with two decimals
pub fn format_currency(amount: f64) -> String {
    format!("${amount:.2}")
}

fn terminal_width() -> Option<usize> {
    terminal_size::terminal_size().map(|(width, _)| width.0 as usize)
}
