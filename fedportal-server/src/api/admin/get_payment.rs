use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use fedportal_core::entities::payments::GetPaymentById;
use kanau::processor::Processor;
use uuid::Uuid;

use crate::api::ApiError;
use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::payment_to_admin_response;

/// `GET /payments/{id}`
pub async fn get_payment(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .db
        .process(GetPaymentById { id })
        .await?
        .ok_or(ApiError::NotFound("payment"))?;
    Ok(Json(payment_to_admin_response(&record)))
}
