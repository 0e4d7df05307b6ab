//! Public competition listing.
//!
//! - `GET /`     – list competitions (drafts hidden unless `?status=draft`)
//! - `GET /{id}` – one competition

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use fedportal_core::entities::competitions::{
    CompetitionRecord, GetCompetitionById, ListCompetitions,
};
use fedportal_sdk::objects::CompetitionResponse;
use fedportal_sdk::objects::competition::ListCompetitionsQuery;
use kanau::processor::Processor;
use uuid::Uuid;

use crate::api::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_competitions))
        .route("/{id}", get(get_competition))
}

fn to_response(record: &CompetitionRecord) -> CompetitionResponse {
    CompetitionResponse {
        id: record.id,
        title: record.title.clone(),
        location: record.location.clone(),
        starts_on: record.starts_on.to_string(),
        registration_deadline: record.registration_deadline.unix_timestamp(),
        status: record.status.into(),
        individual_fee: record.individual_fee,
        preliminary_fee: record.preliminary_fee,
        currency: record.currency.clone(),
        registrations_count: record.registrations_count,
    }
}

async fn list_competitions(
    State(state): State<AppState>,
    Query(query): Query<ListCompetitionsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let records = state
        .db
        .process(ListCompetitions {
            status: query.status.map(Into::into),
        })
        .await?;
    let response: Vec<_> = records.iter().map(to_response).collect();
    Ok(Json(response))
}

async fn get_competition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .db
        .process(GetCompetitionById { id })
        .await?
        .ok_or(ApiError::NotFound("competition"))?;
    Ok(Json(to_response(&record)))
}
