// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live notification fan-out.
//!
//! Committed changes are broadcast to in-process subscribers over a
//! `tokio::sync::broadcast` channel. Notifications are informational only:
//! clients must still query the HTTP API for authoritative state.
//!
//! # Architecture
//!
//! - Publishing never blocks
//! - Slow subscribers lose the oldest notifications
//! - With no subscribers a notification is dropped

use tokio::sync::broadcast;
use tracing::debug;
use workbay_api::{Notification, NotificationSink, NotifyError};

/// Maximum number of notifications to buffer in the broadcast channel.
const NOTIFICATION_BUFFER_SIZE: usize = 256;

/// Broadcast-backed notification sink.
#[derive(Clone)]
pub struct NotificationBroadcaster {
    tx: broadcast::Sender<Notification>,
}

impl NotificationBroadcaster {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(NOTIFICATION_BUFFER_SIZE);
        Self { tx }
    }

    /// Subscribes to notifications published from now on.
    #[cfg(test)]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Default for NotificationBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for NotificationBroadcaster {
    fn publish(&self, notification: Notification) -> Result<(), NotifyError> {
        let event: &'static str = notification.event_name();
        let dealer_id: i64 = notification.dealer_id();
        match self.tx.send(notification) {
            Ok(receivers) => debug!(event, dealer_id, receivers, "Broadcast notification"),
            // No subscribers, which is fine
            Err(_) => debug!(event, dealer_id, "No subscribers for notification"),
        }
        Ok(())
    }
}
