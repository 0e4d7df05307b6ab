use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use fedportal_core::entities::payments::{GetPaymentById, PaymentRecord};
use fedportal_sdk::objects::admin::AdminReconcileResponse;
use kanau::processor::Processor;
use uuid::Uuid;

use crate::api::ApiError;
use crate::api::extractors::AdminAuth;
use crate::api::payments::status::reconcile;
use crate::state::AppState;

use super::payment_to_admin_response;

/// `POST /payments/{id}/reconcile`: poll LiqPay for a payment now.
///
/// Unlike the public status endpoint this also re-checks expired payments,
/// so a late payment can be recovered by hand.
pub async fn reconcile_payment(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state
        .db
        .process(GetPaymentById { id })
        .await?
        .ok_or(ApiError::NotFound("payment"))?;

    let reconciliation = reconcile(&state, payment, true).await?;
    if !reconciliation.reconciled {
        tracing::warn!(payment_id = %id, "Admin reconcile did not reach LiqPay");
    }

    Ok(Json(reconcile_response(
        reconciliation.reconciled,
        &reconciliation.payment,
    )))
}

fn reconcile_response(reconciled: bool, payment: &PaymentRecord) -> AdminReconcileResponse {
    AdminReconcileResponse {
        success: true,
        reconciled,
        payment: payment_to_admin_response(payment),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedportal_core::entities::{PaymentPurpose, PaymentStatus};
    use rust_decimal::Decimal;
    use time::macros::datetime;

    #[test]
    fn test_response_carries_gateway_bookkeeping() {
        let payment = PaymentRecord {
            id: Uuid::from_u128(3),
            order_id: "fp-3".to_string(),
            user_id: Uuid::nil(),
            purpose: PaymentPurpose::Membership,
            competition_id: None,
            registration: None,
            amount: Decimal::new(500, 0),
            currency: "UAH".to_string(),
            description: "Federation membership fee (365 days)".to_string(),
            status: PaymentStatus::Success,
            gateway_status: Some("success".to_string()),
            gateway_payment_id: Some(987654),
            failure_reason: None,
            created_at: datetime!(2026-10-19 10:00 UTC),
            updated_at: datetime!(2026-10-19 10:05 UTC),
            expires_at: datetime!(2026-10-19 10:30 UTC),
            settled_at: Some(datetime!(2026-10-19 10:05 UTC)),
        };
        let value = serde_json::to_value(reconcile_response(false, &payment)).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["reconciled"], false);
        assert_eq!(value["payment"]["order_id"], "fp-3");
        assert_eq!(value["payment"]["gateway_payment_id"], 987654);
    }
}
