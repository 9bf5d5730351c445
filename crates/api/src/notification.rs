// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Notification boundary.
//!
//! Delivery transport (mail, push, websocket) is an external
//! collaborator; the workflow only generates messages and recipient
//! lists. Dispatch is best-effort: a failure after the transition has
//! committed is logged, never rolled back.

use std::sync::Mutex;
use thiserror::Error;

/// A generated notification, ready for a transport to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// The demande the notification concerns.
    pub demande_id: i64,
    /// The demande's human-readable number.
    pub numero: String,
    /// The project scope of the recipients.
    pub projet_id: i64,
    /// Recipient user ids.
    pub recipients: Vec<i64>,
    /// The generated message body.
    pub message: String,
}

/// Errors surfaced by a notification transport.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotifyError {
    /// The transport refused or failed to deliver.
    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(String),
}

/// A pluggable notification transport.
pub trait Notifier: Send + Sync {
    /// Delivers one notification.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails; callers treat this as
    /// best-effort and only log it.
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Default transport: writes the notification to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            demande_id = notification.demande_id,
            numero = %notification.numero,
            recipients = notification.recipients.len(),
            message = %notification.message,
            "notification"
        );
        Ok(())
    }
}

/// Test transport: records every notification for assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every notification delivered so far.
    #[must_use]
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification.clone());
        }
        Ok(())
    }
}
