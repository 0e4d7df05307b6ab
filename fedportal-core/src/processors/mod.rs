//! Background processors.
//!
//! - `ExpiryWatcher`: sweeps overdue payments, emits `NotificationEvent`
//! - `NotificationSender`: receives `NotificationEvent`, sends emails

pub mod expiry_watcher;
pub mod notification_sender;

pub use expiry_watcher::ExpiryWatcher;
pub use notification_sender::{Email, NotificationError, NotificationSender, compose_email};
