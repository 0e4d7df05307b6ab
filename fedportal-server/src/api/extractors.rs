//! Custom Axum extractors for request authentication.
//!
//! Provides:
//! - `AdminAuth`: checks the `Fedportal-Admin-Authorization` header against
//!   the argon2 hash of the admin secret (used by the Admin API).
//! - `LiqPayCallback`: reads the `data` + `signature` form LiqPay posts to
//!   the callback URL and verifies it with the merchant private key.

use axum::{
    Form,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use fedportal_core::gateway::GatewayError;
use fedportal_sdk::objects::CallbackPayload;
use fedportal_sdk::signature::{ADMIN_AUTH_HEADER, SignatureError, SignedPayload};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// AdminAuth
// ---------------------------------------------------------------------------

/// Proof that the request carried the admin secret.
pub struct AdminAuth;

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let secret = parts
            .headers
            .get(ADMIN_AUTH_HEADER)
            .ok_or(ApiError::Unauthorized("missing admin authorization header"))?
            .to_str()
            .map_err(|_| ApiError::Unauthorized("invalid admin authorization header"))?;

        let admin = state.config.admin.read().await;
        if admin.verify_secret(secret) {
            Ok(AdminAuth)
        } else {
            tracing::warn!("Rejected admin request with a wrong secret");
            Err(ApiError::Unauthorized("invalid admin secret"))
        }
    }
}

// ---------------------------------------------------------------------------
// LiqPayCallback
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CallbackForm {
    data: Option<String>,
    signature: Option<String>,
}

/// A callback payload whose signature has been verified.
pub struct LiqPayCallback(pub CallbackPayload);

impl FromRequest<AppState> for LiqPayCallback {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Form(form) = Form::<CallbackForm>::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        let (Some(data), Some(signature)) = (form.data, form.signature) else {
            return Err(ApiError::BadRequest(
                "data and signature fields are required".to_string(),
            ));
        };
        if data.is_empty() || signature.is_empty() {
            return Err(ApiError::BadRequest(
                "data and signature fields are required".to_string(),
            ));
        }

        let signed = SignedPayload { data, signature };
        match state.gateway.verify_callback(&signed).await {
            Ok(payload) => Ok(LiqPayCallback(payload)),
            Err(GatewayError::Signature(
                e @ (SignatureError::Json(_) | SignatureError::InvalidData),
            )) => {
                tracing::warn!(error = %e, "Signed callback carries an undecodable payload");
                Err(ApiError::BadRequest("invalid callback payload".to_string()))
            }
            Err(GatewayError::Signature(e)) => {
                tracing::warn!(error = %e, "Rejected callback with a bad signature");
                Err(ApiError::Unauthorized("invalid signature"))
            }
            Err(e) => Err(ApiError::Gateway(e)),
        }
    }
}
