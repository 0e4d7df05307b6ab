use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use fedportal_core::entities::payments::{GetPaymentById, GetPaymentByOrderId, PaymentRecord};
use fedportal_core::lifecycle::{Reconciliation, reconcile_payment};
use fedportal_sdk::objects::{PaymentStatusQuery, PaymentStatusResponse};
use kanau::processor::Processor;
use time::OffsetDateTime;

use crate::api::{ApiError, payment_view};
use crate::state::AppState;

/// `GET /status?order_id=...` or `?payment_id=...`: current payment status.
///
/// Open payments are re-checked with LiqPay first. A gateway outage is not
/// an error: the stored status is returned with `reconciled: false`.
pub(super) async fn payment_status(
    State(state): State<AppState>,
    Query(query): Query<PaymentStatusQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = find_payment(&state, query).await?;
    let reconciliation = reconcile(&state, payment, false).await?;

    Ok(Json(PaymentStatusResponse {
        success: true,
        payment: payment_view(&reconciliation.payment),
        reconciled: reconciliation.reconciled,
    }))
}

async fn find_payment(
    state: &AppState,
    query: PaymentStatusQuery,
) -> Result<PaymentRecord, ApiError> {
    let found = match (query.payment_id, query.order_id) {
        (Some(id), _) => state.db.process(GetPaymentById { id }).await?,
        (None, Some(order_id)) => state.db.process(GetPaymentByOrderId { order_id }).await?,
        (None, None) => {
            return Err(ApiError::BadRequest(
                "order_id or payment_id is required".to_string(),
            ));
        }
    };
    found.ok_or(ApiError::NotFound("payment"))
}

/// Poll LiqPay for `payment` and emit the notification a change calls for.
pub(crate) async fn reconcile(
    state: &AppState,
    payment: PaymentRecord,
    force: bool,
) -> Result<Reconciliation, ApiError> {
    let reconciliation = reconcile_payment(
        &state.db,
        state.gateway.as_ref(),
        payment,
        state.membership_period_days().await,
        force,
        OffsetDateTime::now_utc(),
    )
    .await?;

    if let Some(event) = reconciliation
        .outcome
        .as_ref()
        .and_then(|outcome| outcome.notification())
    {
        state.event_senders.notify(event);
    }
    Ok(reconciliation)
}
