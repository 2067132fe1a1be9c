//! User-facing notifications.
//!
//! The store reports outcomes through a [`Notifier`]; whoever drives the store
//! owns the receiving end and decides how to show them.

use std::fmt;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Destructive,
}

/// A message meant for the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

/// Sending half of the notification channel
#[derive(Clone, Debug)]
pub struct Notifier {
    tx: UnboundedSender<Notification>,
}

impl Notifier {
    /// Create a notifier and the receiver that observes it
    pub fn channel() -> (Self, UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn info(&self, title: impl Into<String>, description: impl Into<String>) {
        self.send(Notification {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
        });
    }

    pub fn error(&self, title: impl Into<String>, description: impl Into<String>) {
        self.send(Notification {
            title: title.into(),
            description: description.into(),
            severity: Severity::Destructive,
        });
    }

    fn send(&self, notification: Notification) {
        match notification.severity {
            Severity::Info => tracing::info!("{}", notification),
            Severity::Destructive => tracing::warn!("{}", notification),
        }

        if self.tx.send(notification).is_err() {
            tracing::debug!("Notification receiver dropped");
        }
    }
}

/// Take every notification currently queued without waiting
pub fn drain(rx: &mut UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut pending = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        pending.push(notification);
    }
    pending
}
