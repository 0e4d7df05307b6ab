//! Outgoing email configuration.

/// Settings for the HTTP email API used for payment notifications.
///
/// When `enabled` is false, notifications are only written to the log.
#[derive(Debug, Clone, Default)]
pub struct EmailConfig {
    pub enabled: bool,
    /// Endpoint accepting `{from, to, subject, text}` JSON.
    pub api_url: String,
    /// Bearer token for the email API.
    pub api_key: String,
    pub from: String,
}
