//! Dashboard state and the poll-result hand-off.
//!
//! [`App`] owns the two observable pieces of state — the latest readings
//! snapshot and the rolling event log — and mutates them only through
//! [`App::on_poll_result`]. The render loop drains poller outcomes from a
//! channel and feeds them in here, so there is exactly one writer and no
//! lock around the state.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use crate::extract::{extract, Profile, Scalar, Snapshot};
use crate::poll::PollOutcome;
use crate::ui::Theme;

/// One immutable, timestamped entry in the event log.
///
/// The log is append-only; old entries scroll out of the viewport but are
/// never removed.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub stamp: DateTime<Local>,
    pub text: String,
}

impl LogLine {
    fn new(text: impl Into<String>) -> Self {
        Self {
            stamp: Local::now(),
            text: text.into(),
        }
    }
}

/// Result of the most recent poll attempt, for the header indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No attempt has completed yet.
    Unknown,
    Up,
    Down,
}

/// The fixed snapshot shown after a failed poll, so the values panel
/// always shows something actionable instead of stale readings.
pub fn failure_snapshot(reason: &str) -> Snapshot {
    let mut snapshot = Snapshot::new();
    snapshot.push("Status", Scalar::Text("Connection Error".into()));
    snapshot.push("Error", Scalar::Text(reason.into()));
    snapshot
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub profile: Profile,

    /// `None` until the first outcome arrives; `Some` but empty after a
    /// successful poll that matched no configured fields. The two render
    /// as distinct placeholder states.
    pub snapshot: Option<Snapshot>,
    pub log: Vec<LogLine>,

    /// Scrollback distance from the tail of the log; 0 means follow.
    pub log_scrollback: usize,
    pub show_help: bool,

    pub link: LinkState,
    pub attempts: u64,
    pub last_update: Option<Instant>,

    pub target: String,
    pub interval: Duration,
    pub theme: Theme,
}

impl App {
    pub fn new(profile: Profile, target: String, interval: Duration) -> Self {
        let mut app = Self {
            running: true,
            profile,
            snapshot: None,
            log: Vec::new(),
            log_scrollback: 0,
            show_help: false,
            link: LinkState::Unknown,
            attempts: 0,
            last_update: None,
            target,
            interval,
            theme: Theme::auto_detect(),
        };
        app.log_line("Sensor monitor starting...");
        app.log_line("Waiting for sensor data...");
        app
    }

    fn log_line(&mut self, text: impl Into<String>) {
        self.log.push(LogLine::new(text));
    }

    /// Single mutation entry point for poll outcomes.
    ///
    /// On success the snapshot is replaced wholesale with the extracted
    /// readings; nothing from a previous snapshot survives. On failure the
    /// values panel gets the fixed `Status`/`Error` pair and the log gains
    /// one `ERROR:` line.
    pub fn on_poll_result(&mut self, outcome: PollOutcome) {
        self.attempts += 1;
        self.last_update = Some(Instant::now());

        match outcome {
            PollOutcome::Success(raw) => {
                let snapshot = extract(self.profile, &raw);
                self.log_line(format!("Received data: {} values", snapshot.len()));
                self.snapshot = Some(snapshot);
                self.link = LinkState::Up;
            }
            PollOutcome::Failure(reason) => {
                self.log_line(format!("ERROR: {}", reason));
                self.snapshot = Some(failure_snapshot(&reason));
                self.link = LinkState::Down;
            }
        }
    }

    /// Scroll the log view towards older entries.
    pub fn scroll_up(&mut self, n: usize) {
        let max = self.log.len().saturating_sub(1);
        self.log_scrollback = (self.log_scrollback + n).min(max);
    }

    /// Scroll the log view towards newer entries; reaching the tail
    /// resumes following.
    pub fn scroll_down(&mut self, n: usize) {
        self.log_scrollback = self.log_scrollback.saturating_sub(n);
    }

    /// Jump to the oldest entry.
    pub fn scroll_top(&mut self) {
        self.log_scrollback = self.log.len().saturating_sub(1);
    }

    /// Resume following the tail.
    pub fn follow_tail(&mut self) {
        self.log_scrollback = 0;
    }

    pub fn following(&self) -> bool {
        self.log_scrollback == 0
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn app() -> App {
        App::new(
            Profile::Curated,
            "http://purpleair-1a9c/json".into(),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn starts_with_placeholder_state() {
        let app = app();
        assert!(app.snapshot.is_none());
        assert_eq!(app.link, LinkState::Unknown);
        assert_eq!(app.log.len(), 2); // startup banner lines
    }

    #[test]
    fn success_replaces_snapshot_and_logs_count() {
        let mut app = app();
        app.on_poll_result(PollOutcome::Success(json!({
            "pm": {"pm2.5": 12.3},
            "sensor": {"temperature": 75.0}
        })));

        let snapshot = app.snapshot.as_ref().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("PM2.5"), Some(&Scalar::Float(12.3)));
        assert_eq!(app.link, LinkState::Up);
        assert_eq!(app.log.last().unwrap().text, "Received data: 2 values");
    }

    #[test]
    fn snapshot_replacement_is_total() {
        let mut app = app();
        app.on_poll_result(PollOutcome::Success(json!({
            "pm": {"pm2.5": 12.3},
            "sensor": {"temperature": 75.0}
        })));
        app.on_poll_result(PollOutcome::Success(json!({
            "sensor": {"humidity": 40.0}
        })));

        // Nothing from the first snapshot may survive the second.
        let snapshot = app.snapshot.as_ref().unwrap();
        assert_eq!(snapshot.get("PM2.5"), None);
        assert_eq!(snapshot.get("Temp (F)"), None);
        assert_eq!(snapshot.get("Humidity (%)"), Some(&Scalar::Float(40.0)));
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn failure_sets_exact_two_entry_snapshot() {
        let mut app = app();
        app.on_poll_result(PollOutcome::Failure(
            "Timeout after 5s from http://purpleair-1a9c/json".into(),
        ));

        let expected = failure_snapshot("Timeout after 5s from http://purpleair-1a9c/json");
        assert_eq!(app.snapshot.as_ref(), Some(&expected));
        assert_eq!(app.link, LinkState::Down);
    }

    #[test]
    fn one_log_line_per_failed_attempt() {
        let mut app = app();
        let banner = app.log.len();

        app.on_poll_result(PollOutcome::Failure("Timeout after 5s from x".into()));
        app.on_poll_result(PollOutcome::Failure("Connection error: refused".into()));

        assert_eq!(app.log.len(), banner + 2);
        assert_eq!(app.log[banner].text, "ERROR: Timeout after 5s from x");
        assert_eq!(app.log[banner + 1].text, "ERROR: Connection error: refused");
        let timeouts = app.log.iter().filter(|l| l.text.contains("Timeout")).count();
        assert_eq!(timeouts, 1);
    }

    #[test]
    fn empty_success_is_distinct_from_never_polled() {
        let mut app = app();
        assert!(app.snapshot.is_none());

        app.on_poll_result(PollOutcome::Success(json!({})));

        // Sensor answered but matched no fields: Some(empty), not None.
        let snapshot = app.snapshot.as_ref().unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(app.link, LinkState::Up);
    }

    #[test]
    fn failure_after_success_discards_readings() {
        let mut app = app();
        app.on_poll_result(PollOutcome::Success(json!({"pm": {"pm2.5": 12.3}})));
        app.on_poll_result(PollOutcome::Failure("Connection error: reset".into()));

        let snapshot = app.snapshot.as_ref().unwrap();
        assert_eq!(snapshot.get("PM2.5"), None);
        assert_eq!(snapshot.get("Status"), Some(&Scalar::Text("Connection Error".into())));
        assert_eq!(
            snapshot.get("Error"),
            Some(&Scalar::Text("Connection error: reset".into()))
        );
    }

    #[test]
    fn scrollback_clamps_and_resumes_follow() {
        let mut app = app();
        for i in 0..10 {
            app.log_line(format!("line {}", i));
        }

        app.scroll_up(3);
        assert_eq!(app.log_scrollback, 3);
        assert!(!app.following());

        app.scroll_up(1000);
        assert_eq!(app.log_scrollback, app.log.len() - 1);

        app.scroll_down(2);
        assert_eq!(app.log_scrollback, app.log.len() - 3);

        app.follow_tail();
        assert!(app.following());

        app.scroll_top();
        assert_eq!(app.log_scrollback, app.log.len() - 1);
    }
}
