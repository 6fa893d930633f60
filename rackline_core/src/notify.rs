//! # User Notifications
//!
//! Toast-style messages raised by the layout editor (save succeeded, autosave
//! failed, ...). Delivery is the host's concern; the core only calls
//! [`Notifier::notify`].

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    Default,
    Success,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub variant: NotificationVariant,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Notification {
            variant: NotificationVariant::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Error notification
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Notification {
            variant: NotificationVariant::Destructive,
            title: title.into(),
            description: description.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.variant {
            NotificationVariant::Destructive => tracing::warn!(
                title = %notification.title,
                "{}",
                notification.description
            ),
            _ => tracing::info!(
                title = %notification.title,
                "{}",
                notification.description
            ),
        }
    }
}

/// Collects notifications for later inspection.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }

    pub fn count(&self, variant: NotificationVariant) -> usize {
        self.sent.lock().iter().filter(|n| n.variant == variant).count()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        self.sent.lock().push(notification);
    }
}
