//! Axum server setup and router configuration.

use crate::api;
use crate::shutdown::shutdown_signal;
use crate::state::AppState;
use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Build the main application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .nest("/api", api::router())
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Simple health check - returns OK if the server is running.
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Ready check response.
#[derive(Serialize)]
struct ReadyResponse {
    status: &'static str,
    database: &'static str,
}

/// Ready check - verifies the database answers.
async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").execute(&state.db.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(ReadyResponse {
                status: "ready",
                database: "connected",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyResponse {
                    status: "not_ready",
                    database: "disconnected",
                }),
            )
        }
    }
}

/// Run the server with graceful shutdown support.
pub async fn run_server(router: Router, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use fedportal_core::config::{
        AdminConfig, EmailConfig, LiqPayConfig, PaymentsConfig, ServerConfig, SharedConfig,
    };
    use fedportal_core::events::{EventSenders, notification_channel};
    use fedportal_core::framework::DatabaseProcessor;
    use fedportal_core::gateway::LiqPayGateway;
    use fedportal_sdk::signature::{ADMIN_AUTH_HEADER, SignedPayload, encode_data, sign};
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;
    use tower::ServiceExt;

    const PRIVATE_KEY: &str = "sandbox_private";

    /// A router whose database is never reached by the requests under test.
    fn test_router() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://fedportal@localhost/fedportal")
            .unwrap();
        let config = SharedConfig::new(
            ServerConfig {
                listen: SocketAddr::from(([127, 0, 0, 1], 0)),
            },
            AdminConfig::new(AdminConfig::hash_secret("admin-secret").unwrap()),
            LiqPayConfig::new("sandbox_i000", PRIVATE_KEY),
            PaymentsConfig::default(),
            EmailConfig::default(),
        );
        let gateway = Arc::new(LiqPayGateway::new(config.liqpay.clone()));
        let (tx, _rx) = notification_channel();
        build_router(AppState::new(
            DatabaseProcessor::new(pool),
            config,
            gateway,
            EventSenders::new(tx),
        ))
    }

    fn callback_request(body: String) -> Request<Body> {
        Request::post("/api/payments/callback")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_callback_with_forged_signature_is_unauthorized() {
        let forged = SignedPayload {
            data: encode_data(&serde_json::json!({ "status": "success", "order_id": "fp-1" }))
                .unwrap(),
            signature: "AAAAAAAAAAAAAAAAAAAAAAAAAAA=".to_string(),
        };
        let response = test_router()
            .oneshot(callback_request(forged.to_form_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_callback_signed_with_other_key_is_unauthorized() {
        let signed = SignedPayload::new(
            &serde_json::json!({ "status": "success", "order_id": "fp-1" }),
            "someone-else",
        )
        .unwrap();
        let response = test_router()
            .oneshot(callback_request(signed.to_form_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_callback_without_signature_is_bad_request() {
        let response = test_router()
            .oneshot(callback_request("data=eyJhIjoxfQ%3D%3D".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_signed_callback_with_garbage_data_is_bad_request() {
        let data = "not base64 at all";
        let signed = SignedPayload {
            data: data.to_string(),
            signature: sign(data, PRIVATE_KEY),
        };
        let response = test_router()
            .oneshot(callback_request(signed.to_form_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_status_requires_an_id() {
        let response = test_router()
            .oneshot(
                Request::get("/api/payments/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_requires_secret() {
        let response = test_router()
            .oneshot(Request::get("/api/admin/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = test_router()
            .oneshot(
                Request::get("/api/admin/stats")
                    .header(ADMIN_AUTH_HEADER, "guess")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
