use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use fedportal_core::entities::competitions::GetCompetitionById;
use fedportal_core::entities::registrations::ListRegistrations;
use fedportal_sdk::objects::admin::{ListRegistrationsQuery, clamp_pagination};
use kanau::processor::Processor;
use uuid::Uuid;

use crate::api::ApiError;
use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::registration_to_admin_response;

/// `GET /competitions/{id}/registrations`
pub async fn list_registrations(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Path(competition_id): Path<Uuid>,
    Query(query): Query<ListRegistrationsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .process(GetCompetitionById { id: competition_id })
        .await?
        .ok_or(ApiError::NotFound("competition"))?;

    let (limit, offset) = clamp_pagination(query.limit, query.offset);
    let records = state
        .db
        .process(ListRegistrations {
            competition_id,
            kind: query.kind.map(Into::into),
            limit,
            offset,
        })
        .await?;

    let response: Vec<_> = records.iter().map(registration_to_admin_response).collect();
    Ok(Json(response))
}
