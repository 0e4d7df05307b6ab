//! LiqPay merchant configuration.

use fedportal_sdk::objects::liqpay::{API_URL, CHECKOUT_URL};

/// LiqPay merchant credentials and endpoints.
#[derive(Debug, Clone)]
pub struct LiqPayConfig {
    pub public_key: String,
    /// Private key used for signing; never leaves the server.
    pub private_key: String,
    /// Accept `sandbox` payments as paid and send `sandbox=1` with checkouts.
    pub sandbox: bool,
    pub checkout_url: String,
    pub api_url: String,
    /// Public URL of `POST /api/payments/callback`.
    pub callback_url: Option<String>,
    /// Default page LiqPay sends the payer back to.
    pub result_url: Option<String>,
    /// Checkout page language (`uk` or `en`).
    pub language: String,
}

impl LiqPayConfig {
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
            sandbox: false,
            checkout_url: CHECKOUT_URL.to_string(),
            api_url: API_URL.to_string(),
            callback_url: None,
            result_url: None,
            language: "uk".to_string(),
        }
    }
}
