//! Desktop notifications.

use std::sync::Mutex;

/// Application name shown as the notification source.
pub const APP_NAME: &str = "HoyoDaily";

/// Label of the single action button.
pub const ACTION_LABEL: &str = "Open";

pub const REPORT_TITLE: &str = "HoyoDaily Report";

pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}

/// Native notifications via `notify-rust`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) {
        let result = notify_rust::Notification::new()
            .appname(APP_NAME)
            .summary(title)
            .body(body)
            .action("default", ACTION_LABEL)
            .show();

        match result {
            Ok(_) => tracing::debug!(title, "Notification shown"),
            // Notification daemons come and go; never worth more than a warning
            Err(e) => tracing::warn!(title, "Failed to show notification: {}", e),
        }
    }
}

/// Keeps notifications in memory instead of showing them.
///
/// Used by the one-shot `check-in` command when notifications are disabled,
/// and by tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, body: &str) {
        tracing::debug!(title, body, "Notification recorded");
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((title.to_string(), body.to_string()));
        }
    }
}
