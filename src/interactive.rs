//! Interactive dashboard session
//!
//! A single loop owns the [`DashboardState`]. It reads commands from stdin
//! line by line, receives AI results from spawned tasks over an mpsc
//! channel, and redraws after every change. Ctrl+C ends the session.

use crate::app::{Command, CommandOutcome, DashboardState};
use crate::boundary::RenderBoundary;
use apicontrol_core::error::Result;
use apicontrol_core::settings::SAVED_NOTICE_DURATION;
use apicontrol_core::types::ServiceData;
use apicontrol_insights::{InsightClient, insight_or_fallback};
use apicontrol_terminal::output::OutputFormatter;
use chrono::Utc;
use colored::*;
use std::io::Write;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Completed insight: request sequence number and display text
type InsightMessage = (u64, String);

const HELP_TEXT: &str = "\
Commands:
  1 | overview      Dashboard overview
  2 | analytics     Detailed analytics
  3 | users         User management
  4 | settings      Platform settings
  r | refresh       Request a new AI analysis
  reload            Regenerate all data
  budget <amount>   Set the monthly budget cap
  cycle <monthly|weekly|threshold>
  alerts on|off     Email alerts
  anomaly on|off    Anomaly detection
  save              Save settings
  help              Show this list
  q | quit          Exit (or press Ctrl+C)";

/// Interactive terminal session
pub struct InteractiveSession {
    state: DashboardState,
    formatter: Box<dyn OutputFormatter>,
    boundary: RenderBoundary,
    client: Option<InsightClient>,
    /// Message shown under the view until the next redraw
    status: Option<String>,
}

impl InteractiveSession {
    pub fn new(
        state: DashboardState,
        formatter: Box<dyn OutputFormatter>,
        boundary: RenderBoundary,
        client: Option<InsightClient>,
    ) -> Self {
        Self {
            state,
            formatter,
            boundary,
            client,
            status: None,
        }
    }

    /// Run until quit, Ctrl+C or end of input
    pub async fn run(mut self) -> Result<()> {
        let (tx, mut rx) = mpsc::channel::<InsightMessage>(8);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut notice_deadline: Option<tokio::time::Instant> = None;

        self.request_insight(&tx);
        self.draw();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        debug!("Input closed");
                        break;
                    };
                    if line.trim().is_empty() {
                        self.draw();
                        continue;
                    }
                    match self.handle_line(&line, &tx) {
                        Some(CommandOutcome::Quit) => break,
                        Some(CommandOutcome::Saved) => {
                            notice_deadline =
                                Some(tokio::time::Instant::now() + SAVED_NOTICE_DURATION);
                        }
                        _ => {}
                    }
                    self.draw();
                }
                Some(message) = rx.recv() => {
                    if self.receive_insight(message) {
                        self.draw();
                    }
                }
                _ = notice_timer(notice_deadline) => {
                    notice_deadline = None;
                    self.draw();
                }
                _ = tokio::signal::ctrl_c() => {
                    println!("\nExiting dashboard...");
                    break;
                }
            }
        }

        info!("Dashboard session ended");
        Ok(())
    }

    fn handle_line(
        &mut self,
        line: &str,
        tx: &mpsc::Sender<InsightMessage>,
    ) -> Option<CommandOutcome> {
        let result = line
            .parse::<Command>()
            .and_then(|command| self.state.apply_command(command, Utc::now(), Instant::now()));

        match result {
            Ok(CommandOutcome::RequestInsight) => {
                self.request_insight(tx);
                Some(CommandOutcome::RequestInsight)
            }
            Ok(CommandOutcome::Help) => {
                self.status = Some(HELP_TEXT.to_string());
                Some(CommandOutcome::Help)
            }
            Ok(outcome) => Some(outcome),
            Err(e) => {
                self.status = Some(e.to_string().red().to_string());
                None
            }
        }
    }

    /// Spawn one analysis; its result comes back tagged with a sequence number
    fn request_insight(&mut self, tx: &mpsc::Sender<InsightMessage>) {
        let Some(client) = self.client.clone() else {
            return;
        };
        let seq = self.state.begin_insight();
        debug!("Starting insight request #{}", seq);
        spawn_insight(client, seq, self.state.services().to_vec(), tx.clone());
    }

    /// Apply a finished analysis; returns whether the view changed
    fn receive_insight(&mut self, (seq, text): InsightMessage) -> bool {
        self.state.complete_insight(seq, text)
    }

    fn draw(&mut self) {
        let rendered = self.boundary.render(|| {
            let snapshot = self.state.snapshot(Instant::now())?;
            Ok(self.formatter.format_view(&snapshot))
        });

        // Clear screen and move cursor to top-left
        print!("\x1B[2J\x1B[1;1H");
        println!("{}", rendered.output);
        if let Some(status) = self.status.take() {
            println!("{status}");
        }
        print!("{} ", "apicontrol>".bold());
        if let Err(e) = std::io::stdout().flush() {
            debug!("Failed to flush stdout: {}", e);
        }
    }
}

fn spawn_insight(
    client: InsightClient,
    seq: u64,
    services: Vec<ServiceData>,
    tx: mpsc::Sender<InsightMessage>,
) {
    tokio::spawn(async move {
        let text = insight_or_fallback(client.analyze(&services).await);
        if tx.send((seq, text)).await.is_err() {
            debug!("Session closed before insight #{} arrived", seq);
        }
    });
}

/// Resolves when the saved notice expires; never without a deadline
async fn notice_timer(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
