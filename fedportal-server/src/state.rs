//! Application state shared across all request handlers.

use fedportal_core::config::SharedConfig;
use fedportal_core::events::EventSenders;
use fedportal_core::framework::DatabaseProcessor;
use fedportal_core::gateway::PaymentGateway;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseProcessor,
    /// Runtime configuration (can be reloaded via SIGHUP).
    pub config: SharedConfig,
    pub gateway: Arc<dyn PaymentGateway>,
    pub event_senders: EventSenders,
}

impl AppState {
    pub fn new(
        db: DatabaseProcessor,
        config: SharedConfig,
        gateway: Arc<dyn PaymentGateway>,
        event_senders: EventSenders,
    ) -> Self {
        Self {
            db,
            config,
            gateway,
            event_senders,
        }
    }

    /// Membership extension granted by one membership payment.
    pub async fn membership_period_days(&self) -> i32 {
        self.config.payments.read().await.membership_period_days
    }
}
