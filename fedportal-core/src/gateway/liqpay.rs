use std::sync::Arc;

use async_trait::async_trait;
use fedportal_sdk::objects::liqpay::{API_VERSION, format_expired_date};
use fedportal_sdk::objects::{CallbackPayload, CheckoutParams, StatusRequest};
use fedportal_sdk::signature::SignedPayload;
use tokio::sync::RwLock;
use tracing::debug;

use super::{Checkout, CheckoutOrder, GatewayError, PaymentGateway};
use crate::config::LiqPayConfig;

/// LiqPay API v3 client.
///
/// Reads credentials from the shared config on every call so a SIGHUP
/// reload takes effect immediately.
pub struct LiqPayGateway {
    config: Arc<RwLock<LiqPayConfig>>,
    http_client: reqwest::Client,
}

impl LiqPayGateway {
    pub fn new(config: Arc<RwLock<LiqPayConfig>>) -> Self {
        Self {
            config,
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    fn checkout_params(config: &LiqPayConfig, order: CheckoutOrder) -> CheckoutParams {
        CheckoutParams {
            version: API_VERSION,
            public_key: config.public_key.clone(),
            action: "pay".to_string(),
            amount: order.amount,
            currency: order.currency,
            description: order.description,
            order_id: order.order_id,
            server_url: config.callback_url.clone(),
            result_url: order.result_url.or_else(|| config.result_url.clone()),
            language: order.language.or_else(|| Some(config.language.clone())),
            expired_date: Some(format_expired_date(order.expires_at)),
            sandbox: config.sandbox.then_some(1),
        }
    }
}

/// Turn an error `result` into [`GatewayError::Api`], except for
/// `payment_not_found`, which callers handle as an answer.
fn status_result(payload: CallbackPayload) -> Result<CallbackPayload, GatewayError> {
    if payload.result.as_deref() == Some("error") && !payload.is_payment_not_found() {
        return Err(GatewayError::Api {
            code: payload.err_code.unwrap_or_default(),
            description: payload.err_description.unwrap_or_default(),
        });
    }
    Ok(payload)
}

#[async_trait]
impl PaymentGateway for LiqPayGateway {
    async fn checkout(&self, order: CheckoutOrder) -> Result<Checkout, GatewayError> {
        let config = self.config.read().await;
        let params = Self::checkout_params(&config, order);
        let payload = SignedPayload::new(&params, &config.private_key)?;
        Ok(Checkout {
            checkout_url: config.checkout_url.clone(),
            payload,
        })
    }

    async fn verify_callback(
        &self,
        payload: &SignedPayload,
    ) -> Result<CallbackPayload, GatewayError> {
        let config = self.config.read().await;
        Ok(payload.verify_and_decode(&config.private_key)?)
    }

    async fn fetch_status(&self, order_id: &str) -> Result<CallbackPayload, GatewayError> {
        let (api_url, body) = {
            let config = self.config.read().await;
            let request = StatusRequest::new(config.public_key.clone(), order_id);
            let signed = SignedPayload::new(&request, &config.private_key)?;
            (config.api_url.clone(), signed.to_form_body())
        };

        let response = self
            .http_client
            .post(api_url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?
            .error_for_status()?;

        let payload: CallbackPayload = response.json().await?;
        debug!(order_id, status = %payload.status, "LiqPay status response");
        status_result(payload)
    }

    async fn sandbox(&self) -> bool {
        self.config.read().await.sandbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedportal_sdk::signature::SignatureError;
    use rust_decimal::Decimal;
    use time::macros::datetime;

    fn gateway(sandbox: bool) -> LiqPayGateway {
        let mut config = LiqPayConfig::new("sandbox_i000", "sandbox_private");
        config.sandbox = sandbox;
        config.callback_url = Some("https://portal.example.org/api/payments/callback".to_string());
        config.result_url = Some("https://portal.example.org/payments/done".to_string());
        LiqPayGateway::new(Arc::new(RwLock::new(config)))
    }

    fn order() -> CheckoutOrder {
        CheckoutOrder {
            order_id: "fp-0001".to_string(),
            amount: Decimal::new(2400, 0),
            currency: "UAH".to_string(),
            description: "National Cup: preliminary registration (12)".to_string(),
            expires_at: datetime!(2026-10-19 12:30 UTC),
            result_url: None,
            language: None,
        }
    }

    #[tokio::test]
    async fn test_checkout_is_signed_with_private_key() {
        let checkout = gateway(false).checkout(order()).await.unwrap();
        assert_eq!(checkout.checkout_url, fedportal_sdk::objects::liqpay::CHECKOUT_URL);

        let params: CheckoutParams = checkout.payload.verify_and_decode("sandbox_private").unwrap();
        assert_eq!(params.action, "pay");
        assert_eq!(params.version, 3);
        assert_eq!(params.public_key, "sandbox_i000");
        assert_eq!(params.order_id, "fp-0001");
        assert_eq!(params.amount, Decimal::new(2400, 0));
        assert_eq!(params.expired_date.as_deref(), Some("2026-10-19 12:30:00"));
        assert_eq!(
            params.server_url.as_deref(),
            Some("https://portal.example.org/api/payments/callback")
        );
        assert_eq!(params.language.as_deref(), Some("uk"));
        assert_eq!(params.sandbox, None);
    }

    #[tokio::test]
    async fn test_checkout_request_overrides_defaults() {
        let mut order = order();
        order.result_url = Some("https://portal.example.org/cup".to_string());
        order.language = Some("en".to_string());
        let checkout = gateway(true).checkout(order).await.unwrap();
        let params: CheckoutParams = checkout.payload.decode().unwrap();
        assert_eq!(params.result_url.as_deref(), Some("https://portal.example.org/cup"));
        assert_eq!(params.language.as_deref(), Some("en"));
        assert_eq!(params.sandbox, Some(1));
    }

    #[tokio::test]
    async fn test_verify_callback_rejects_foreign_signature() {
        let gateway = gateway(false);
        let genuine = SignedPayload::new(
            &serde_json::json!({ "status": "success", "order_id": "fp-0001" }),
            "sandbox_private",
        )
        .unwrap();
        let payload = gateway.verify_callback(&genuine).await.unwrap();
        assert_eq!(payload.order_id.as_deref(), Some("fp-0001"));

        let forged = SignedPayload::new(
            &serde_json::json!({ "status": "success", "order_id": "fp-0001" }),
            "attacker",
        )
        .unwrap();
        assert!(matches!(
            gateway.verify_callback(&forged).await,
            Err(GatewayError::Signature(SignatureError::SignatureMismatch))
        ));
    }

    fn status_response(value: serde_json::Value) -> CallbackPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_status_error_result_is_a_gateway_error() {
        let result = status_result(status_response(serde_json::json!({
            "result": "error",
            "status": "error",
            "err_code": "public_key_not_found",
            "err_description": "public_key not found"
        })));
        assert!(matches!(
            result,
            Err(GatewayError::Api { ref code, ref description })
                if code == "public_key_not_found" && description == "public_key not found"
        ));
    }

    #[test]
    fn test_status_payment_not_found_is_an_answer() {
        let payload = status_result(status_response(serde_json::json!({
            "result": "error",
            "status": "error",
            "err_code": "payment_not_found"
        })))
        .unwrap();
        assert!(payload.is_payment_not_found());
    }

    #[test]
    fn test_status_ok_result_passes_through() {
        let payload = status_result(status_response(serde_json::json!({
            "result": "ok",
            "status": "wait_accept",
            "order_id": "fp-0001"
        })))
        .unwrap();
        assert_eq!(payload.status, "wait_accept");
    }
}
