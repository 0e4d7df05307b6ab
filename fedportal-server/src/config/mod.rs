//! Configuration module for fedportal-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables. Also handles admin secret hashing.

pub mod file;

use crate::config::file::FileConfig;
use fedportal_core::config::{
    AdminConfig, EmailConfig, LiqPayConfig, PaymentsConfig, ServerConfig, SharedConfig,
};
use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Longest time a created payment stays payable.
const MAX_PAYMENT_TTL_MINUTES: i64 = 7 * 24 * 60;
const MAX_EXPIRY_SWEEP_INTERVAL_SECS: u64 = 24 * 60 * 60;
const MAX_MEMBERSHIP_PERIOD_DAYS: i32 = 10 * 366;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("password hashing error: {0}")]
    HashError(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Loaded configuration result containing all parts.
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub liqpay: LiqPayConfig,
    pub payments: PaymentsConfig,
    pub email: EmailConfig,
}

impl LoadedConfig {
    pub fn into_shared(self) -> SharedConfig {
        SharedConfig::new(
            self.server,
            self.admin,
            self.liqpay,
            self.payments,
            self.email,
        )
    }

    /// Replace every section of a running config, waking watchers of the
    /// payments section.
    pub async fn apply_to(self, shared: &SharedConfig) {
        *shared.server.write().await = self.server;
        *shared.admin.write().await = self.admin;
        *shared.liqpay.write().await = self.liqpay;
        *shared.email.write().await = self.email;
        shared.payments.update(self.payments).await;
    }
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Hash the admin secret if it's plaintext (and rewrite the file)
    /// 5. Build the loaded configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        validate(&file_config)?;

        let secret_hash = if file_config.is_admin_secret_hashed() {
            file_config.admin.secret.clone()
        } else {
            let hash = AdminConfig::hash_secret(&file_config.admin.secret)
                .map_err(|e| ConfigError::HashError(e.to_string()))?;
            file_config.admin.secret = hash.clone();
            self.rewrite_config(&file_config)?;
            tracing::info!("Admin secret hashed and config file updated");
            hash
        };

        // the override is never written back to the file
        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        Ok(build_loaded_config(file_config, secret_hash))
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn rewrite_config(&self, config: &FileConfig) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(config)?;

        // Write atomically: write to temp file, then rename
        let temp_path = self.config_path.with_extension("toml.tmp");
        std::fs::write(&temp_path, toml_string)?;
        std::fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    let invalid = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

    if config.admin.secret.is_empty() {
        return invalid("admin.secret must not be empty");
    }
    if config.liqpay.public_key.is_empty() || config.liqpay.private_key.is_empty() {
        return invalid("liqpay.public_key and liqpay.private_key are required");
    }
    for (name, value) in [
        ("liqpay.checkout_url", &config.liqpay.checkout_url),
        ("liqpay.api_url", &config.liqpay.api_url),
    ] {
        if Url::parse(value).is_err() {
            return Err(ConfigError::ValidationError(format!(
                "{name} is not a valid URL"
            )));
        }
    }
    if !matches!(config.liqpay.language.as_str(), "uk" | "en") {
        return invalid("liqpay.language must be \"uk\" or \"en\"");
    }

    let payments = &config.payments;
    if payments.currency.len() != 3 || !payments.currency.chars().all(|c| c.is_ascii_uppercase())
    {
        return invalid("payments.currency must be an ISO 4217 code such as \"UAH\"");
    }
    if payments.membership_fee.round_dp(2) <= Decimal::ZERO {
        return invalid("payments.membership_fee must be at least 0.01");
    }
    if !(1..=MAX_MEMBERSHIP_PERIOD_DAYS).contains(&payments.membership_period_days) {
        return Err(ConfigError::ValidationError(format!(
            "payments.membership_period_days must be between 1 and {MAX_MEMBERSHIP_PERIOD_DAYS}"
        )));
    }
    if !(1..=MAX_PAYMENT_TTL_MINUTES).contains(&payments.payment_ttl_minutes) {
        return Err(ConfigError::ValidationError(format!(
            "payments.payment_ttl_minutes must be between 1 and {MAX_PAYMENT_TTL_MINUTES}"
        )));
    }
    if !(1..=MAX_EXPIRY_SWEEP_INTERVAL_SECS).contains(&payments.expiry_sweep_interval_secs) {
        return Err(ConfigError::ValidationError(format!(
            "payments.expiry_sweep_interval_secs must be between 1 and {MAX_EXPIRY_SWEEP_INTERVAL_SECS}"
        )));
    }

    let email = &config.email;
    if email.enabled {
        if Url::parse(&email.api_url).is_err() {
            return invalid("email.api_url must be a valid URL when email is enabled");
        }
        if email.from.is_empty() {
            return invalid("email.from is required when email is enabled");
        }
    }
    Ok(())
}

fn build_loaded_config(file_config: FileConfig, secret_hash: String) -> LoadedConfig {
    let FileConfig {
        server,
        liqpay,
        payments,
        email,
        ..
    } = file_config;

    LoadedConfig {
        server: ServerConfig {
            listen: server.listen,
        },
        admin: AdminConfig::new(secret_hash),
        liqpay: LiqPayConfig {
            sandbox: liqpay.sandbox,
            checkout_url: liqpay.checkout_url,
            api_url: liqpay.api_url,
            callback_url: liqpay.callback_url.map(String::from),
            result_url: liqpay.result_url.map(String::from),
            language: liqpay.language,
            ..LiqPayConfig::new(liqpay.public_key, liqpay.private_key)
        },
        payments: PaymentsConfig {
            currency: payments.currency,
            membership_fee: payments.membership_fee,
            membership_period_days: payments.membership_period_days,
            payment_ttl: time::Duration::minutes(payments.payment_ttl_minutes),
            expiry_sweep_interval: std::time::Duration::from_secs(
                payments.expiry_sweep_interval_secs,
            ),
        },
        email: EmailConfig {
            enabled: email.enabled,
            api_url: email.api_url,
            api_key: email.api_key,
            from: email.from,
        },
    }
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}
