//! Admin API request and response types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PaymentStatus, RegistrationKind};
use super::payment::PaymentView;

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Full payment detail for the admin API (includes gateway bookkeeping).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminPaymentResponse {
    #[serde(flatten)]
    pub payment: PaymentView,
    pub description: String,
    pub gateway_payment_id: Option<i64>,
    pub updated_at: i64,
}

/// Response of `POST /api/admin/payments/{id}/reconcile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminReconcileResponse {
    pub success: bool,
    /// Whether LiqPay answered the status request.
    pub reconciled: bool,
    pub payment: AdminPaymentResponse,
}

/// A registration row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminRegistrationResponse {
    pub id: i64,
    pub competition_id: Uuid,
    pub user_id: Uuid,
    pub club_id: Option<Uuid>,
    pub kind: RegistrationKind,
    pub participant_name: Option<String>,
    pub headcount: i32,
    pub payment_id: Option<Uuid>,
    pub created_at: i64,
}

/// Payment count and volume for one status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusBucket {
    pub status: PaymentStatus,
    pub count: i64,
    pub total: Decimal,
}

/// Response of `GET /api/admin/stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminStatsResponse {
    pub buckets: Vec<StatusBucket>,
    /// Sum over `success` payments.
    pub collected: Decimal,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 200;
const MAX_OFFSET: i64 = 100_000;

/// Query parameters for listing payments.
#[derive(Debug, Clone, Deserialize)]
pub struct ListPaymentsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub status: Option<PaymentStatus>,
    pub user_id: Option<Uuid>,
    pub competition_id: Option<Uuid>,
}

/// Query parameters for listing registrations of a competition.
#[derive(Debug, Clone, Deserialize)]
pub struct ListRegistrationsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub kind: Option<RegistrationKind>,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

/// Clamp limit and offset to safe maximums.
pub fn clamp_pagination(limit: i64, offset: i64) -> (i64, i64) {
    (limit.clamp(1, MAX_LIMIT), offset.clamp(0, MAX_OFFSET))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_pagination() {
        assert_eq!(clamp_pagination(0, -5), (1, 0));
        assert_eq!(clamp_pagination(50, 10), (50, 10));
        assert_eq!(clamp_pagination(10_000, 1_000_000), (MAX_LIMIT, MAX_OFFSET));
    }
}
