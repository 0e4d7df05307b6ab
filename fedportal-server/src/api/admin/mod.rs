//! Admin API handlers.
//!
//! These endpoints are called by the federation's admin dashboard and
//! require the `Fedportal-Admin-Authorization` header with the plaintext
//! admin secret.
//!
//! # Endpoints
//!
//! - `GET  /payments`                          – list payments (paginated, filterable)
//! - `GET  /payments/{id}`                     – one payment with gateway bookkeeping
//! - `POST /payments/{id}/reconcile`           – force a LiqPay status poll
//! - `POST /payments/{id}/cancel`              – cancel an open payment
//! - `GET  /competitions/{id}/registrations`   – registrations of a competition
//! - `GET  /stats`                             – payment counts and volume per status

use axum::{
    Router,
    routing::{get, post},
};
use fedportal_core::entities::payments::PaymentRecord;
use fedportal_core::entities::registrations::RegistrationRecord;
use fedportal_sdk::objects::admin::{AdminPaymentResponse, AdminRegistrationResponse};

use crate::api::payment_view;
use crate::state::AppState;

mod cancel_payment;
mod get_payment;
mod list_payments;
mod list_registrations;
mod reconcile_payment;
mod stats;

/// Build the Admin API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payments", get(list_payments::list_payments))
        .route("/payments/{id}", get(get_payment::get_payment))
        .route(
            "/payments/{id}/reconcile",
            post(reconcile_payment::reconcile_payment),
        )
        .route("/payments/{id}/cancel", post(cancel_payment::cancel_payment))
        .route(
            "/competitions/{id}/registrations",
            get(list_registrations::list_registrations),
        )
        .route("/stats", get(stats::stats))
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

pub(crate) fn payment_to_admin_response(r: &PaymentRecord) -> AdminPaymentResponse {
    AdminPaymentResponse {
        payment: payment_view(r),
        description: r.description.clone(),
        gateway_payment_id: r.gateway_payment_id,
        updated_at: r.updated_at.unix_timestamp(),
    }
}

pub(crate) fn registration_to_admin_response(r: &RegistrationRecord) -> AdminRegistrationResponse {
    AdminRegistrationResponse {
        id: r.id,
        competition_id: r.competition_id,
        user_id: r.user_id,
        club_id: r.club_id,
        kind: r.kind.into(),
        participant_name: r.participant_name.clone(),
        headcount: r.headcount,
        payment_id: r.payment_id,
        created_at: r.created_at.unix_timestamp(),
    }
}
