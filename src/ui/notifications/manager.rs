// SPDX-License-Identifier: MPL-2.0
//! Notification lifecycle management.
//!
//! At most one banner is visible. A new push replaces the current banner at
//! once, and since each banner carries its own deadline the replaced one can
//! no longer expire anything.

use super::notification::{Notification, NotificationId, Severity};
use std::time::Instant;

/// Messages for notification state changes.
#[derive(Debug, Clone)]
pub enum Message {
    /// Dismiss a specific notification by ID.
    Dismiss(NotificationId),
}

#[derive(Debug, Default)]
pub struct Manager {
    current: Option<Notification>,
}

impl Manager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows a notification, replacing any visible one.
    pub fn push(&mut self, notification: Notification) {
        match notification.severity() {
            Severity::Error => tracing::warn!(
                key = notification.message_key(),
                args = ?notification.message_args(),
                "error notification"
            ),
            Severity::Info => tracing::debug!(key = notification.message_key(), "info notification"),
        }
        if let Some(previous) = self.current.replace(notification) {
            tracing::trace!(key = previous.message_key(), "notification replaced");
        }
    }

    /// Dismisses the notification with `id` if it is still the visible one.
    ///
    /// Returns `true` if it was removed.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        if self.current.as_ref().is_some_and(|n| n.id() == id) {
            self.current = None;
            return true;
        }
        false
    }

    /// Dismisses the visible notification if its deadline has passed.
    pub fn tick_at(&mut self, now: Instant) {
        if self.current.as_ref().is_some_and(|n| n.is_expired_at(now)) {
            self.current = None;
        }
    }

    pub fn handle_message(&mut self, message: &Message) {
        match message {
            Message::Dismiss(id) => {
                self.dismiss(*id);
            }
        }
    }

    /// The visible notification, if any.
    #[must_use]
    pub fn visible(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn has_notifications(&self) -> bool {
        self.current.is_some()
    }
}
