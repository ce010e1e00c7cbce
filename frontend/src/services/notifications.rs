//! Injected replacement for app-wide flash messages.

use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Error,
}

/// Receives user-facing notifications from the controller and mutation layer
pub trait NotificationSink: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str);
}

/// Default sink: writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Success | NotificationKind::Info => tracing::info!(?kind, "{}", message),
            NotificationKind::Warning => tracing::warn!(?kind, "{}", message),
            NotificationKind::Error => tracing::error!(?kind, "{}", message),
        }
    }
}

/// Keeps every notification in memory
#[derive(Debug, Default)]
pub struct RecordingNotificationSink {
    entries: Mutex<Vec<(NotificationKind, String)>>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(NotificationKind, String)> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, kind: NotificationKind) -> usize {
        self.entries().iter().filter(|(k, _)| *k == kind).count()
    }
}

impl NotificationSink for RecordingNotificationSink {
    fn notify(&self, kind: NotificationKind, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((kind, message.to_string()));
        }
    }
}
