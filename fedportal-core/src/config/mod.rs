//! Configuration types for the federation portal.
//!
//! These types represent the validated runtime configuration used by the
//! server and the background processors. The actual config loading/parsing
//! is handled by the server crate.

mod admin;
mod config_store;
mod email;
mod liqpay;
mod payments;
mod server;

pub use admin::AdminConfig;
pub use config_store::{ConfigStore, ConfigWatcher};
pub use email::EmailConfig;
pub use liqpay::LiqPayConfig;
pub use payments::PaymentsConfig;
pub use server::ServerConfig;

use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared configuration state with separate locks for each section.
///
/// This allows independent access to different configuration sections
/// without blocking other readers/writers.
#[derive(Clone)]
pub struct SharedConfig {
    /// Server configuration (listen address).
    pub server: Arc<RwLock<ServerConfig>>,
    /// Admin configuration (authentication).
    pub admin: Arc<RwLock<AdminConfig>>,
    /// LiqPay merchant credentials and endpoints.
    pub liqpay: Arc<RwLock<LiqPayConfig>>,
    /// Fees and payment lifetimes; watched by the expiry sweeper.
    pub payments: ConfigStore<PaymentsConfig>,
    /// Outgoing email.
    pub email: Arc<RwLock<EmailConfig>>,
}

impl SharedConfig {
    pub fn new(
        server: ServerConfig,
        admin: AdminConfig,
        liqpay: LiqPayConfig,
        payments: PaymentsConfig,
        email: EmailConfig,
    ) -> Self {
        Self {
            server: Arc::new(RwLock::new(server)),
            admin: Arc::new(RwLock::new(admin)),
            liqpay: Arc::new(RwLock::new(liqpay)),
            payments: ConfigStore::new(payments),
            email: Arc::new(RwLock::new(email)),
        }
    }
}
