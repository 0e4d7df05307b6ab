//! Event system connecting request handlers to background processors.
//!
//! # Event Flow
//!
//! 1. A status transition commits (callback, status poll, admin action, or
//!    the expiry sweep).
//! 2. The caller emits `NotificationEvent` -> `NotificationSender`.
//!
//! Events are ephemeral; losing one only loses an email.

pub mod channels;
pub mod types;

pub use channels::{
    DEFAULT_CHANNEL_BUFFER, EventSenders, NotificationEventReceiver, NotificationEventSender,
    notification_channel,
};

pub use types::NotificationEvent;
