//! LiqPay API v3 message formats.
//!
//! Requests are JSON objects that get wrapped into a signed `data` field
//! (see [`crate::signature`]). Callbacks and the `status` API answer with
//! the same [`CallbackPayload`] shape.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PaymentStatus;

/// Hosted checkout page the payer's browser is redirected (form-POSTed) to.
pub const CHECKOUT_URL: &str = "https://www.liqpay.ua/api/3/checkout";

/// Server-to-server API endpoint.
pub const API_URL: &str = "https://www.liqpay.ua/api/request";

/// Protocol version we speak.
pub const API_VERSION: u8 = 3;

/// Error code LiqPay returns when it has no record of an order.
pub const ERR_PAYMENT_NOT_FOUND: &str = "payment_not_found";

/// Parameters of a `pay` checkout request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutParams {
    pub version: u8,
    pub public_key: String,
    pub action: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub order_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// UTC time after which LiqPay refuses the payment, `YYYY-MM-DD HH:MM:SS`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<u8>,
}

/// Parameters of a `status` API request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRequest {
    pub version: u8,
    pub public_key: String,
    pub action: String,
    pub order_id: String,
}

impl StatusRequest {
    pub fn new(public_key: impl Into<String>, order_id: impl Into<String>) -> Self {
        Self {
            version: API_VERSION,
            public_key: public_key.into(),
            action: "status".to_string(),
            order_id: order_id.into(),
        }
    }
}

/// Payment report posted to our callback URL, also returned by the
/// `status` API.
///
/// LiqPay omits most fields depending on the payment type, so everything
/// except `status` is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackPayload {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub payment_id: Option<i64>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<i64>,
    #[serde(default)]
    pub paytype: Option<String>,
    #[serde(default)]
    pub err_code: Option<String>,
    #[serde(default)]
    pub err_description: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    /// Unix milliseconds.
    #[serde(default)]
    pub create_date: Option<i64>,
    /// Unix milliseconds.
    #[serde(default)]
    pub end_date: Option<i64>,
}

impl CallbackPayload {
    pub fn gateway_status(&self) -> GatewayStatus {
        GatewayStatus::from(self.status.as_str())
    }

    /// Whether the gateway reported that it has never seen this order.
    pub fn is_payment_not_found(&self) -> bool {
        self.err_code.as_deref() == Some(ERR_PAYMENT_NOT_FOUND)
    }
}

/// A LiqPay status string grouped by what it means for us.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GatewayStatus {
    Success,
    /// Test payment; only counts as paid when sandbox mode is enabled.
    Sandbox,
    Failure,
    Error,
    TryAgain,
    Reversed,
    Unsubscribed,
    Expired,
    /// Any of the intermediate verification / waiting states.
    InProgress(String),
    Unknown(String),
}

const IN_PROGRESS: &[&str] = &[
    "processing",
    "prepared",
    "wait_secure",
    "wait_accept",
    "wait_lc",
    "hold_wait",
    "wait_compensation",
    "wait_reserve",
    "wait_card",
    "wait_qr",
    "wait_sender",
    "invoice_wait",
    "cash_wait",
    "3ds_verify",
    "otp_verify",
    "cvv_verify",
    "sender_verify",
    "receiver_verify",
    "captcha_verify",
    "ivr_verify",
    "password_verify",
    "phone_verify",
    "pin_verify",
    "senderapp_verify",
    "subscribed",
];

impl From<&str> for GatewayStatus {
    fn from(value: &str) -> Self {
        match value {
            "success" => GatewayStatus::Success,
            "sandbox" => GatewayStatus::Sandbox,
            "failure" => GatewayStatus::Failure,
            "error" => GatewayStatus::Error,
            "try_again" => GatewayStatus::TryAgain,
            "reversed" => GatewayStatus::Reversed,
            "unsubscribed" => GatewayStatus::Unsubscribed,
            "expired" => GatewayStatus::Expired,
            other if IN_PROGRESS.contains(&other) => GatewayStatus::InProgress(other.to_string()),
            other => GatewayStatus::Unknown(other.to_string()),
        }
    }
}

impl GatewayStatus {
    /// Map to the internal status.
    ///
    /// `sandbox_enabled` decides whether a `sandbox` report is a real
    /// success or a test payment that leaked into production.
    pub fn to_payment_status(&self, sandbox_enabled: bool) -> PaymentStatus {
        match self {
            GatewayStatus::Success => PaymentStatus::Success,
            GatewayStatus::Sandbox if sandbox_enabled => PaymentStatus::Success,
            GatewayStatus::Sandbox => PaymentStatus::Failed,
            GatewayStatus::Failure | GatewayStatus::Error | GatewayStatus::TryAgain => {
                PaymentStatus::Failed
            }
            GatewayStatus::Reversed | GatewayStatus::Unsubscribed => PaymentStatus::Cancelled,
            GatewayStatus::Expired => PaymentStatus::Expired,
            GatewayStatus::InProgress(_) => PaymentStatus::Processing,
            GatewayStatus::Unknown(_) => PaymentStatus::Pending,
        }
    }
}

/// Format a timestamp the way LiqPay's `expired_date` expects it.
pub fn format_expired_date(at: time::OffsetDateTime) -> String {
    let format = time::macros::format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    at.to_offset(time::UtcOffset::UTC)
        .format(&format)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            ("success", PaymentStatus::Success),
            ("failure", PaymentStatus::Failed),
            ("error", PaymentStatus::Failed),
            ("try_again", PaymentStatus::Failed),
            ("reversed", PaymentStatus::Cancelled),
            ("unsubscribed", PaymentStatus::Cancelled),
            ("expired", PaymentStatus::Expired),
            ("processing", PaymentStatus::Processing),
            ("wait_secure", PaymentStatus::Processing),
            ("3ds_verify", PaymentStatus::Processing),
            ("something_new", PaymentStatus::Pending),
        ];
        for (raw, expected) in cases {
            assert_eq!(
                GatewayStatus::from(raw).to_payment_status(false),
                expected,
                "status {raw}"
            );
        }
    }

    #[test]
    fn test_sandbox_only_counts_in_sandbox_mode() {
        assert_eq!(
            GatewayStatus::Sandbox.to_payment_status(true),
            PaymentStatus::Success
        );
        assert_eq!(
            GatewayStatus::Sandbox.to_payment_status(false),
            PaymentStatus::Failed
        );
    }

    #[test]
    fn test_callback_payload_parses_liqpay_json() {
        let raw = r#"{
            "action":"pay","payment_id":165629,"status":"success","version":3,
            "type":"buy","paytype":"card","public_key":"i000","acq_id":414963,
            "order_id":"fp-0192","liqpay_order_id":"NYMK3AE61501685438251925",
            "description":"Membership fee","amount":150.0,"currency":"UAH",
            "transaction_id":165629,"create_date":1501685438000,"end_date":1501685438000
        }"#;
        let payload: CallbackPayload = serde_json::from_str(raw).unwrap();
        assert_eq!(payload.gateway_status(), GatewayStatus::Success);
        assert_eq!(payload.order_id.as_deref(), Some("fp-0192"));
        assert_eq!(payload.amount, Some(Decimal::new(150, 0)));
        assert!(!payload.is_payment_not_found());
    }

    #[test]
    fn test_not_found_response() {
        let raw = r#"{"result":"error","status":"error","err_code":"payment_not_found","err_description":"payment_not_found"}"#;
        let payload: CallbackPayload = serde_json::from_str(raw).unwrap();
        assert!(payload.is_payment_not_found());
        assert_eq!(payload.order_id, None);
    }

    #[test]
    fn test_checkout_params_omit_empty_fields() {
        let params = CheckoutParams {
            version: API_VERSION,
            public_key: "i000".to_string(),
            action: "pay".to_string(),
            amount: Decimal::new(15050, 2),
            currency: "UAH".to_string(),
            description: "Membership fee".to_string(),
            order_id: "fp-1".to_string(),
            server_url: None,
            result_url: None,
            language: None,
            expired_date: None,
            sandbox: None,
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["amount"], serde_json::json!(150.5));
        assert!(value.get("server_url").is_none());
        assert!(value.get("sandbox").is_none());
    }

    #[test]
    fn test_expired_date_format() {
        let at = time::macros::datetime!(2026-03-05 07:08:09 +02:00);
        assert_eq!(format_expired_date(at), "2026-03-05 05:08:09");
    }
}
