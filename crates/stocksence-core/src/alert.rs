//! # Alerts
//!
//! Transient, user-visible outcome messages ("Product created", "Only 3 in
//! stock"). Operations report to a [`NotificationSink`] handed to them by the
//! caller; the sink decides how and for how long to show them.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;
use ts_rs::TS;

/// How long an alert stays visible unless configured otherwise.
pub const DEFAULT_ALERT_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum AlertKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

impl Alert {
    pub fn new(kind: AlertKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(AlertKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(AlertKind::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(AlertKind::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(AlertKind::Info, message)
    }
}

/// Receiver of operation outcomes.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, alert: Alert);
}

/// Sink that drops every alert. For batch jobs such as seeding.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _alert: Alert) {}
}

/// Sink that keeps every alert in order. Used by tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alerts received so far, oldest first.
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts
            .lock()
            .map(|alerts| alerts.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Alert> {
        self.alerts().pop()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, alert: Alert) {
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.push(alert);
        }
    }
}
