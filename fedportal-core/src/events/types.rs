//! Event type definitions.
//!
//! Events carry identifiers rather than full rows; consumers re-fetch the
//! current state from the database.

use crate::entities::PaymentStatus;
use uuid::Uuid;

/// Events that trigger a member notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// A payment moved to a new status (success, failed, expired, cancelled).
    PaymentStatusChanged {
        payment_id: Uuid,
        new_status: PaymentStatus,
    },
}

impl NotificationEvent {
    pub fn payment_id(&self) -> Uuid {
        match self {
            NotificationEvent::PaymentStatusChanged { payment_id, .. } => *payment_id,
        }
    }
}
