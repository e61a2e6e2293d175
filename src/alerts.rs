use ratatui::style::Color;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

const MAX_ALERTS: usize = 16;
const SHOW_FOR: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn color(self) -> Color {
        match self {
            Self::Info => Color::Cyan,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    pub severity: Severity,
    pub raised_at: Instant,
}

impl Alert {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self { message: message.into(), severity, raised_at: Instant::now() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Error)
    }
}

/// Global notification stream; the status bar shows the newest live entry.
#[derive(Debug, Default)]
pub struct AlertStream {
    alerts: VecDeque<Alert>,
    dismissed: bool,
}

impl AlertStream {
    pub fn push(&mut self, alert: Alert) {
        match alert.severity {
            Severity::Info => info!(message = %alert.message, "alert"),
            Severity::Warning => warn!(message = %alert.message, "alert"),
            Severity::Error => error!(message = %alert.message, "alert"),
        }
        if self.alerts.len() == MAX_ALERTS {
            self.alerts.pop_front();
        }
        self.alerts.push_back(alert);
        self.dismissed = false;
    }

    pub fn current(&self, now: Instant) -> Option<&Alert> {
        if self.dismissed {
            return None;
        }
        self.alerts
            .back()
            .filter(|a| now.saturating_duration_since(a.raised_at) < SHOW_FOR)
    }

    pub fn dismiss(&mut self) {
        self.dismissed = true;
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_bounded_history() {
        let mut s = AlertStream::default();
        for i in 0..20 {
            s.push(Alert::warning(format!("w{i}")));
        }
        assert_eq!(s.len(), MAX_ALERTS);
        assert_eq!(s.iter().next().map(|a| a.message.as_str()), Some("w4"));
    }

    #[test]
    fn current_expires_and_can_be_dismissed() {
        let mut s = AlertStream::default();
        s.push(Alert::error("boom"));
        let raised = s.iter().next().unwrap().raised_at;
        assert_eq!(s.current(raised).map(|a| a.severity), Some(Severity::Error));
        assert!(s.current(raised + SHOW_FOR).is_none());

        s.dismiss();
        assert!(s.current(raised).is_none());
        s.push(Alert::warning("again"));
        assert!(s.current(Instant::now()).is_some());
    }
}
