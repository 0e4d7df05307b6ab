use axum::{Json, extract::State, response::IntoResponse};
use fedportal_core::entities::payments::GetPaymentByOrderId;
use fedportal_core::lifecycle::{ApplyStatusReport, ReportSource, StatusReport};
use fedportal_sdk::objects::CallbackAck;
use kanau::processor::Processor;

use crate::api::ApiError;
use crate::api::extractors::LiqPayCallback;
use crate::state::AppState;

/// `POST /callback`: LiqPay reports a payment outcome.
///
/// Duplicate and out-of-order reports are acknowledged with
/// `changed: false` so LiqPay stops retrying them.
pub(super) async fn payment_callback(
    State(state): State<AppState>,
    LiqPayCallback(payload): LiqPayCallback,
) -> Result<impl IntoResponse, ApiError> {
    let order_id = payload
        .order_id
        .clone()
        .ok_or_else(|| ApiError::BadRequest("callback without order_id".to_string()))?;

    let payment = state
        .db
        .process(GetPaymentByOrderId {
            order_id: order_id.clone(),
        })
        .await?
        .ok_or_else(|| {
            tracing::warn!(order_id = %order_id, "Callback for an unknown order");
            ApiError::NotFound("payment")
        })?;

    tracing::info!(
        order_id = %order_id,
        gateway_status = %payload.status,
        gateway_payment_id = ?payload.payment_id,
        "LiqPay callback received"
    );

    let report =
        StatusReport::from_gateway(&payload, state.gateway.sandbox().await, ReportSource::Callback);
    let outcome = state
        .db
        .process(ApplyStatusReport {
            payment_id: payment.id,
            report,
            membership_period_days: state.membership_period_days().await,
        })
        .await?;

    if let Some(event) = outcome.notification() {
        state.event_senders.notify(event);
    }

    Ok(Json(CallbackAck {
        success: true,
        status: outcome.payment.status.into(),
        changed: outcome.changed(),
    }))
}
