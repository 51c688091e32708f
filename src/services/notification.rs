//! Notification service implementation
//!
//! Transient user-facing messages, shown once and then dropped. Every
//! interaction boundary turns its outcome into one notification; subscribers
//! receive them over a broadcast channel and statistics are kept per kind.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::utils::helpers::generate_uuid;

const DEFAULT_CAPACITY: usize = 64;

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::Success => write!(f, "success"),
            NotificationKind::Info => write!(f, "info"),
            NotificationKind::Warning => write!(f, "warning"),
            NotificationKind::Error => write!(f, "error"),
        }
    }
}

/// A single transient message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Notification statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationStats {
    pub success: u64,
    pub info: u64,
    pub warning: u64,
    pub error: u64,
}

impl NotificationStats {
    pub fn total(&self) -> u64 {
        self.success + self.info + self.warning + self.error
    }
}

/// Notification channel shared by all views
#[derive(Clone, Debug)]
pub struct NotificationService {
    sender: broadcast::Sender<Notification>,
    stats: Arc<Mutex<NotificationStats>>,
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl NotificationService {
    /// Create a new NotificationService keeping at most `capacity` undelivered messages
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            stats: Arc::new(Mutex::new(NotificationStats::default())),
        }
    }

    /// Receive every notification emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn notify(&self, kind: NotificationKind, message: impl Into<String>) -> Notification {
        let notification = Notification {
            id: generate_uuid(),
            kind,
            message: message.into(),
            created_at: Utc::now(),
        };

        match kind {
            NotificationKind::Error => warn!(message = %notification.message, "Error notification"),
            NotificationKind::Warning => info!(message = %notification.message, "Warning notification"),
            _ => debug!(kind = %kind, message = %notification.message, "Notification"),
        }

        self.record(kind);
        if self.sender.send(notification.clone()).is_err() {
            debug!("No notification subscribers");
        }
        notification
    }

    pub fn success(&self, message: impl Into<String>) -> Notification {
        self.notify(NotificationKind::Success, message)
    }

    pub fn info(&self, message: impl Into<String>) -> Notification {
        self.notify(NotificationKind::Info, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> Notification {
        self.notify(NotificationKind::Warning, message)
    }

    pub fn error(&self, message: impl Into<String>) -> Notification {
        self.notify(NotificationKind::Error, message)
    }

    pub fn stats(&self) -> NotificationStats {
        match self.stats.lock() {
            Ok(stats) => stats.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, kind: NotificationKind) {
        let mut stats = match self.stats.lock() {
            Ok(stats) => stats,
            Err(poisoned) => poisoned.into_inner(),
        };
        match kind {
            NotificationKind::Success => stats.success += 1,
            NotificationKind::Info => stats.info += 1,
            NotificationKind::Warning => stats.warning += 1,
            NotificationKind::Error => stats.error += 1,
        }
    }
}

/// Take every notification currently queued on `receiver` without waiting
pub fn drain(receiver: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut pending = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(notification) => pending.push(notification),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                warn!(skipped = skipped, "Notification subscriber lagged");
            }
            Err(_) => break,
        }
    }
    pending
}
