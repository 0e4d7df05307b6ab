//! Payment API request and response types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PaymentPurpose, PaymentStatus, RegistrationKind};

/// Competition sign-up details attached to a competition payment.
///
/// Stored with the pending payment and turned into a registration row
/// once the payment succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationDetails {
    pub kind: RegistrationKind,
    #[serde(default)]
    pub club_id: Option<Uuid>,
    #[serde(default)]
    pub participant_name: Option<String>,
    #[serde(default)]
    pub headcount: Option<i32>,
}

/// Request body for `POST /api/payments/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    pub user_id: Uuid,
    pub purpose: PaymentPurpose,
    #[serde(default)]
    pub competition_id: Option<Uuid>,
    #[serde(default)]
    pub registration: Option<RegistrationDetails>,
    /// Where LiqPay sends the payer after checkout; overrides the default.
    #[serde(default)]
    pub result_url: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Response of `POST /api/payments/create`.
///
/// The frontend form-POSTs `data` and `signature` to `checkout_url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentResponse {
    pub success: bool,
    pub payment_id: Uuid,
    pub order_id: String,
    pub checkout_url: String,
    pub data: String,
    pub signature: String,
    pub amount: Decimal,
    pub currency: String,
    /// Unix timestamp.
    pub expires_at: i64,
}

/// Query for `GET /api/payments/status`. One of the two ids is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentStatusQuery {
    pub order_id: Option<String>,
    pub payment_id: Option<Uuid>,
}

/// Public view of a payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentView {
    pub payment_id: Uuid,
    pub order_id: String,
    pub user_id: Uuid,
    pub purpose: PaymentPurpose,
    pub competition_id: Option<Uuid>,
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    pub gateway_status: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: i64,
    pub expires_at: i64,
    pub settled_at: Option<i64>,
}

/// Response of `GET /api/payments/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusResponse {
    pub success: bool,
    pub payment: PaymentView,
    /// Whether the gateway was consulted successfully on this request.
    pub reconciled: bool,
}

/// Response of `POST /api/payments/callback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackAck {
    pub success: bool,
    pub status: PaymentStatus,
    /// `false` for duplicate or rejected reports.
    pub changed: bool,
}
