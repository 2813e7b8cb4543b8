use std::sync::Mutex;

use tracing::{error, info};

/// User-facing outcome messages ("toasts"). Fire-and-forget: delivery is
/// never acknowledged and must not block the workflow.
pub trait NotificationSink: Send + Sync {
    fn notify_success(&self, message: &str);
    fn notify_error(&self, message: &str);
}

/// Routes notifications into the tracing pipeline. The default sink when the
/// host application has no UI toast channel wired up.
#[derive(Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify_success(&self, message: &str) {
        info!("{}", message);
    }

    fn notify_error(&self, message: &str) {
        error!("{}", message);
    }
}

/// One captured notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Collects notifications in memory so tests can assert on exactly what the
/// actor was told.
#[derive(Debug, Default)]
pub struct MemorySink {
    notices: Mutex<Vec<Notice>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().expect("sink poisoned").clone()
    }
}

impl NotificationSink for MemorySink {
    fn notify_success(&self, message: &str) {
        self.notices
            .lock()
            .expect("sink poisoned")
            .push(Notice::Success(message.to_string()));
    }

    fn notify_error(&self, message: &str) {
        self.notices
            .lock()
            .expect("sink poisoned")
            .push(Notice::Error(message.to_string()));
    }
}
