//! Payment lifecycle handlers.
//!
//! # Endpoints
//!
//! - `POST /create`   – price a payment, persist it and return the signed checkout form
//! - `POST /callback` – LiqPay server-to-server callback
//! - `GET  /status`   – current status, reconciled with LiqPay while still open

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

mod callback;
mod create;
pub(crate) mod status;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create::create_payment))
        .route("/callback", post(callback::payment_callback))
        .route("/status", get(status::payment_status))
}
