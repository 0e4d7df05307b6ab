//! Error type shared by every API handler.
//!
//! Every failure is rendered as `{ "success": false, "error": "..." }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fedportal_core::gateway::GatewayError;
use fedportal_core::lifecycle::LifecycleError;
use fedportal_core::pricing::QuoteError;
use fedportal_sdk::objects::ErrorBody;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(&'static str),
    Forbidden(&'static str),
    NotFound(&'static str),
    Conflict(String),
    Database(sqlx::Error),
    Gateway(GatewayError),
    Internal(String),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, (*msg).to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, (*msg).to_string()),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::Database(_) | ApiError::Gateway(_) | ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Database(e) => tracing::error!(error = %e, "API database error"),
            ApiError::Gateway(e) => tracing::error!(error = %e, "API gateway error"),
            ApiError::Internal(e) => tracing::error!(error = %e, "API internal error"),
            _ => {}
        }
        let (status, message) = self.status_and_message();
        (status, Json(ErrorBody::new(message))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Database(e)
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        ApiError::Gateway(e)
    }
}

impl From<LifecycleError> for ApiError {
    fn from(e: LifecycleError) -> Self {
        match e {
            LifecycleError::NotFound(_) => ApiError::NotFound("payment"),
            LifecycleError::Database(e) => ApiError::Database(e),
            LifecycleError::Gateway(e) => ApiError::Gateway(e),
            other @ LifecycleError::Inconsistent { .. } => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<QuoteError> for ApiError {
    fn from(e: QuoteError) -> Self {
        match e {
            QuoteError::RegistrationClosed => ApiError::Conflict(e.to_string()),
            _ => ApiError::BadRequest(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let response = ApiError::NotFound("payment").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_of(response).await,
            serde_json::json!({ "success": false, "error": "payment not found" })
        );
    }

    #[tokio::test]
    async fn test_internal_errors_are_not_leaked() {
        let response = ApiError::Internal("connection refused to 10.0.0.5".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await["error"], "internal server error");
    }

    #[test]
    fn test_quote_errors_map_to_client_errors() {
        let (status, _) = ApiError::from(QuoteError::RegistrationClosed).status_and_message();
        assert_eq!(status, StatusCode::CONFLICT);
        let (status, message) = ApiError::from(QuoteError::MissingClub).status_and_message();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "club_id is required for preliminary registration");
    }

    #[test]
    fn test_missing_payment_is_404() {
        let err = ApiError::from(LifecycleError::NotFound(uuid::Uuid::nil()));
        assert_eq!(err.status_and_message().0, StatusCode::NOT_FOUND);
    }
}
