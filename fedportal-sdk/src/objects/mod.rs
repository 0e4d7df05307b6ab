pub mod admin;
pub mod competition;
pub mod liqpay;
pub mod payment;

pub use competition::{CompetitionResponse, CompetitionStatus};
pub use liqpay::{CallbackPayload, CheckoutParams, GatewayStatus, StatusRequest};
pub use payment::{
    CallbackAck, CreatePaymentRequest, CreatePaymentResponse, PaymentStatusQuery,
    PaymentStatusResponse, PaymentView, RegistrationDetails,
};

use serde::{Deserialize, Serialize};

/// Internal payment status.
///
/// This is the API/DTO version without sqlx::Type.
/// For database operations, use the version in `fedportal-core::entities`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Success,
    Failed,
    Expired,
    Cancelled,
}

impl PaymentStatus {
    /// Statuses after which no further gateway report is expected.
    pub fn is_final(self) -> bool {
        matches!(
            self,
            PaymentStatus::Success | PaymentStatus::Failed | PaymentStatus::Cancelled
        )
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Processing => write!(f, "processing"),
            PaymentStatus::Success => write!(f, "success"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::Expired => write!(f, "expired"),
            PaymentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// What a payment pays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentPurpose {
    Membership,
    Competition,
}

/// Competition sign-up stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationKind {
    /// Club-level headcount.
    Preliminary,
    /// Named participant.
    Individual,
}

/// Error body returned by every endpoint on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
