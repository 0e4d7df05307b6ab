//! Event channel factories and handles.

use super::types::NotificationEvent;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Default buffer size for event channels.
///
/// This provides enough buffer to handle bursts while keeping memory bounded.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for NotificationEvent events.
pub type NotificationEventSender = mpsc::Sender<NotificationEvent>;
/// Receiver handle for NotificationEvent events.
pub type NotificationEventReceiver = mpsc::Receiver<NotificationEvent>;

/// Create a new NotificationEvent channel.
pub fn notification_channel() -> (NotificationEventSender, NotificationEventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Container for all event channel senders.
#[derive(Clone)]
pub struct EventSenders {
    /// Sender for NotificationEvent events
    pub notification: NotificationEventSender,
}

impl EventSenders {
    pub fn new(notification: NotificationEventSender) -> Self {
        Self { notification }
    }

    /// Queue a notification without waiting for room.
    ///
    /// Notifications are best-effort: a full or closed channel drops the
    /// event with a log line.
    pub fn notify(&self, event: NotificationEvent) {
        match self.notification.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!(
                    payment_id = %event.payment_id(),
                    "Notification channel full, dropping NotificationEvent"
                );
            }
            Err(TrySendError::Closed(event)) => {
                tracing::error!(
                    payment_id = %event.payment_id(),
                    "Failed to emit NotificationEvent: channel closed"
                );
            }
        }
    }
}
