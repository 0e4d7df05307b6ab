//! HTTP API.
//!
//! # Endpoints
//!
//! - `/api/payments/*`     – payment lifecycle (create, LiqPay callback, status)
//! - `/api/competitions/*` – public competition listing
//! - `/api/admin/*`        – payment administration, requires the admin secret

use axum::Router;
use fedportal_core::entities::payments::PaymentRecord;
use fedportal_sdk::objects::PaymentView;

use crate::state::AppState;

mod admin;
mod competitions;
pub mod error;
pub mod extractors;
mod payments;

pub use error::ApiError;

/// Build the `/api` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/payments", payments::router())
        .nest("/competitions", competitions::router())
        .nest("/admin", admin::router())
}

pub(crate) fn payment_view(record: &PaymentRecord) -> PaymentView {
    PaymentView {
        payment_id: record.id,
        order_id: record.order_id.clone(),
        user_id: record.user_id,
        purpose: record.purpose.into(),
        competition_id: record.competition_id,
        amount: record.amount,
        currency: record.currency.clone(),
        status: record.status.into(),
        gateway_status: record.gateway_status.clone(),
        failure_reason: record.failure_reason.clone(),
        created_at: record.created_at.unix_timestamp(),
        expires_at: record.expires_at.unix_timestamp(),
        settled_at: record.settled_at.map(|t| t.unix_timestamp()),
    }
}
