//! TOML file configuration structures.
//!
//! These structs directly map to the `fedportal-config.toml` file format.

use fedportal_sdk::objects::liqpay::{API_URL, CHECKOUT_URL};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub liqpay: LiqPayConfig,
    #[serde(default)]
    pub payments: PaymentsConfig,
    #[serde(default)]
    pub email: EmailConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Admin configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// The admin secret. If this is plaintext (doesn't start with `$argon2`),
    /// it will be hashed and the config file will be rewritten.
    pub secret: String,
}

/// LiqPay merchant section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiqPayConfig {
    pub public_key: String,
    pub private_key: String,
    #[serde(default)]
    pub sandbox: bool,
    #[serde(default = "default_checkout_url")]
    pub checkout_url: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Public URL of `POST /api/payments/callback`, sent as `server_url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_url: Option<Url>,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_checkout_url() -> String {
    CHECKOUT_URL.to_string()
}

fn default_api_url() -> String {
    API_URL.to_string()
}

fn default_language() -> String {
    "uk".to_string()
}

/// Fees and payment lifetimes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentsConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_membership_fee")]
    pub membership_fee: Decimal,
    #[serde(default = "default_membership_period_days")]
    pub membership_period_days: i32,
    /// Minutes a created payment stays payable.
    #[serde(default = "default_payment_ttl_minutes")]
    pub payment_ttl_minutes: i64,
    #[serde(default = "default_expiry_sweep_interval_secs")]
    pub expiry_sweep_interval_secs: u64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            membership_fee: default_membership_fee(),
            membership_period_days: default_membership_period_days(),
            payment_ttl_minutes: default_payment_ttl_minutes(),
            expiry_sweep_interval_secs: default_expiry_sweep_interval_secs(),
        }
    }
}

fn default_currency() -> String {
    "UAH".to_string()
}

fn default_membership_fee() -> Decimal {
    Decimal::new(500, 0)
}

fn default_membership_period_days() -> i32 {
    365
}

fn default_payment_ttl_minutes() -> i64 {
    30
}

fn default_expiry_sweep_interval_secs() -> u64 {
    60
}

/// Outgoing email section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub from: String,
}

impl FileConfig {
    /// Check if the admin secret is already hashed (argon2 format).
    pub fn is_admin_secret_hashed(&self) -> bool {
        fedportal_core::config::AdminConfig::is_hashed(&self.admin.secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[admin]
secret = "test-secret"

[liqpay]
public_key = "sandbox_i000"
private_key = "sandbox_secret"
sandbox = true
callback_url = "https://portal.example.org/api/payments/callback"
language = "en"

[payments]
currency = "UAH"
membership_fee = 750.5
payment_ttl_minutes = 15

[email]
enabled = true
api_url = "https://mail.example.org/v1/send"
api_key = "key"
from = "noreply@example.org"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert!(config.liqpay.sandbox);
        assert_eq!(config.liqpay.api_url, API_URL);
        assert_eq!(config.payments.membership_fee, Decimal::new(7505, 1));
        assert_eq!(config.payments.payment_ttl_minutes, 15);
        assert_eq!(config.payments.membership_period_days, 365);
        assert!(config.email.enabled);
        assert!(!config.is_admin_secret_hashed());
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let toml_str = r#"
[admin]
secret = "$argon2id$v=19$m=19456,t=2,p=1$abc123"

[liqpay]
public_key = "i000"
private_key = "secret"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen, default_listen_addr());
        assert_eq!(config.liqpay.checkout_url, CHECKOUT_URL);
        assert_eq!(config.liqpay.language, "uk");
        assert!(config.liqpay.callback_url.is_none());
        assert_eq!(config.payments.currency, "UAH");
        assert_eq!(config.payments.expiry_sweep_interval_secs, 60);
        assert!(!config.email.enabled);
        assert!(config.is_admin_secret_hashed());
    }

    #[test]
    fn test_missing_liqpay_section_is_an_error() {
        let toml_str = r#"
[admin]
secret = "test-secret"
"#;
        assert!(toml::from_str::<FileConfig>(toml_str).is_err());
    }
}
