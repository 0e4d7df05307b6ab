//! Payment gateway access.
//!
//! The portal only talks to LiqPay, but handlers and processors go through
//! the [`PaymentGateway`] trait so the lifecycle logic does not depend on
//! the HTTP client.

mod liqpay;

pub use liqpay::LiqPayGateway;

use async_trait::async_trait;
use fedportal_sdk::objects::CallbackPayload;
use fedportal_sdk::signature::{SignatureError, SignedPayload};
use rust_decimal::Decimal;
use thiserror::Error;
use time::OffsetDateTime;

/// Errors that can occur while talking to the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Signing or verification failed
    #[error("signature error: {0}")]
    Signature(#[from] SignatureError),

    /// Payload serialization error
    #[error("payload serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The gateway answered with an error result
    #[error("gateway error {code}: {description}")]
    Api { code: String, description: String },
}

/// What the payer is about to pay.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutOrder {
    pub order_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub expires_at: OffsetDateTime,
    pub result_url: Option<String>,
    pub language: Option<String>,
}

/// A signed checkout form, ready to be POSTed by the payer's browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub checkout_url: String,
    pub payload: SignedPayload,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Build and sign the checkout form for an order.
    async fn checkout(&self, order: CheckoutOrder) -> Result<Checkout, GatewayError>;

    /// Verify a callback's signature and decode its payload.
    async fn verify_callback(
        &self,
        payload: &SignedPayload,
    ) -> Result<CallbackPayload, GatewayError>;

    /// Ask the gateway for the current status of an order.
    ///
    /// An order the gateway has never seen is returned as a payload with
    /// `err_code = payment_not_found`, not as an error.
    async fn fetch_status(&self, order_id: &str) -> Result<CallbackPayload, GatewayError>;

    /// Whether `sandbox` reports count as paid.
    async fn sandbox(&self) -> bool;
}
