use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use fedportal_core::entities::PaymentStatus;
use fedportal_core::lifecycle::{ApplyStatusReport, ReportSource, StatusReport, Transition};
use kanau::processor::Processor;
use uuid::Uuid;

use crate::api::ApiError;
use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::payment_to_admin_response;

/// `POST /payments/{id}/cancel`: cancel a payment that is still open.
///
/// Repeating a cancel is a no-op that answers 200 with the payment; any
/// other settled payment answers 409.
pub async fn cancel_payment(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .db
        .process(ApplyStatusReport {
            payment_id: id,
            report: StatusReport::internal(
                PaymentStatus::Cancelled,
                Some("cancelled by administrator".to_string()),
                ReportSource::Admin,
            ),
            membership_period_days: state.membership_period_days().await,
        })
        .await?;

    ensure_cancellable(outcome.transition, outcome.previous)?;
    if let Some(event) = outcome.notification() {
        state.event_senders.notify(event);
    }

    Ok(Json(payment_to_admin_response(&outcome.payment)))
}

fn ensure_cancellable(transition: Transition, previous: PaymentStatus) -> Result<(), ApiError> {
    match transition {
        Transition::Apply | Transition::Unchanged => Ok(()),
        Transition::Rejected => Err(ApiError::Conflict(format!(
            "payment is {} and can no longer be cancelled",
            fedportal_sdk::objects::PaymentStatus::from(previous)
        ))),
    }
}
