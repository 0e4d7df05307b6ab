use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use fedportal_core::entities::payments::ListPayments;
use fedportal_sdk::objects::admin::{ListPaymentsQuery, clamp_pagination};
use kanau::processor::Processor;

use crate::api::ApiError;
use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::payment_to_admin_response;

/// `GET /payments`: list payments with pagination and optional filters.
pub async fn list_payments(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Query(query): Query<ListPaymentsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (limit, offset) = clamp_pagination(query.limit, query.offset);

    let records = state
        .db
        .process(ListPayments {
            limit,
            offset,
            status: query.status.map(Into::into),
            user_id: query.user_id,
            competition_id: query.competition_id,
        })
        .await?;

    let response: Vec<_> = records.iter().map(payment_to_admin_response).collect();
    Ok(Json(response))
}
