use crate::entities::PaymentStatus;
use crate::entities::payments::{PaymentRecord, PaymentStatusUpdate};
use fedportal_sdk::objects::{CallbackPayload, GatewayStatus};
use rust_decimal::Decimal;
use tracing::warn;

/// Where a status report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSource {
    Callback,
    StatusPoll,
    Admin,
}

impl std::fmt::Display for ReportSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportSource::Callback => write!(f, "callback"),
            ReportSource::StatusPoll => write!(f, "status_poll"),
            ReportSource::Admin => write!(f, "admin"),
        }
    }
}

/// A status some party claims a payment is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub status: PaymentStatus,
    pub source: ReportSource,
    /// Raw LiqPay status, kept for bookkeeping.
    pub gateway_status: Option<String>,
    pub gateway_payment_id: Option<i64>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub failure_reason: Option<String>,
}

impl StatusReport {
    /// Map a gateway payload (callback or `status` response).
    pub fn from_gateway(payload: &CallbackPayload, sandbox: bool, source: ReportSource) -> Self {
        let gateway_status = payload.gateway_status();
        let status: PaymentStatus = gateway_status.to_payment_status(sandbox).into();

        let failure_reason = match (&gateway_status, status) {
            (GatewayStatus::Sandbox, PaymentStatus::Failed) => {
                Some("sandbox payment reported outside sandbox mode".to_string())
            }
            (_, PaymentStatus::Failed | PaymentStatus::Cancelled) => payload
                .err_description
                .clone()
                .or_else(|| payload.err_code.clone())
                .or_else(|| Some(format!("gateway reported {}", payload.status))),
            _ => None,
        };

        if let GatewayStatus::Unknown(raw) = &gateway_status {
            warn!(
                order_id = payload.order_id.as_deref().unwrap_or_default(),
                gateway_status = %raw,
                %source,
                "Unknown LiqPay status, treating payment as pending"
            );
        }

        Self {
            status,
            source,
            gateway_status: Some(payload.status.clone()),
            gateway_payment_id: payload.payment_id,
            amount: payload.amount,
            currency: payload.currency.clone(),
            failure_reason,
        }
    }

    /// A status decided by the portal itself rather than the gateway.
    pub fn internal(status: PaymentStatus, reason: Option<String>, source: ReportSource) -> Self {
        Self {
            status,
            source,
            gateway_status: None,
            gateway_payment_id: None,
            amount: None,
            currency: None,
            failure_reason: reason,
        }
    }

    /// Downgrade a gateway `success` to `failed` when the paid amount or
    /// currency differs from what was charged.
    pub fn checked_against(mut self, payment: &PaymentRecord) -> Self {
        if self.status != PaymentStatus::Success || self.source == ReportSource::Admin {
            return self;
        }
        let amount_ok = self.amount == Some(payment.amount);
        let currency_ok = self
            .currency
            .as_deref()
            .is_some_and(|currency| currency.eq_ignore_ascii_case(&payment.currency));
        if amount_ok && currency_ok {
            return self;
        }

        let reported = format!(
            "{} {}",
            self.amount.map(|a| a.to_string()).unwrap_or_else(|| "?".to_string()),
            self.currency.as_deref().unwrap_or("?")
        );
        warn!(
            payment_id = %payment.id,
            order_id = %payment.order_id,
            expected_amount = %payment.amount,
            expected_currency = %payment.currency,
            reported = %reported,
            "Paid amount does not match the payment"
        );
        self.status = PaymentStatus::Failed;
        self.failure_reason = Some(format!(
            "amount mismatch: expected {} {}, gateway reported {reported}",
            payment.amount, payment.currency
        ));
        self
    }

    pub(crate) fn to_update(&self) -> PaymentStatusUpdate {
        PaymentStatusUpdate {
            status: self.status,
            gateway_status: self.gateway_status.clone(),
            gateway_payment_id: self.gateway_payment_id,
            failure_reason: self.failure_reason.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PaymentPurpose;
    use time::macros::datetime;
    use uuid::Uuid;

    fn payment() -> PaymentRecord {
        PaymentRecord {
            id: Uuid::nil(),
            order_id: "fp-1".to_string(),
            user_id: Uuid::nil(),
            purpose: PaymentPurpose::Membership,
            competition_id: None,
            registration: None,
            amount: Decimal::new(500, 0),
            currency: "UAH".to_string(),
            description: "Federation membership fee (365 days)".to_string(),
            status: PaymentStatus::Pending,
            gateway_status: None,
            gateway_payment_id: None,
            failure_reason: None,
            created_at: datetime!(2026-10-19 10:00 UTC),
            updated_at: datetime!(2026-10-19 10:00 UTC),
            expires_at: datetime!(2026-10-19 10:30 UTC),
            settled_at: None,
        }
    }

    fn payload(status: &str, amount: i64, currency: &str) -> CallbackPayload {
        serde_json::from_value(serde_json::json!({
            "status": status,
            "order_id": "fp-1",
            "payment_id": 42,
            "amount": amount as f64,
            "currency": currency,
        }))
        .unwrap()
    }

    #[test]
    fn test_matching_success_is_kept() {
        let report = StatusReport::from_gateway(
            &payload("success", 500, "UAH"),
            false,
            ReportSource::Callback,
        )
        .checked_against(&payment());
        assert_eq!(report.status, PaymentStatus::Success);
        assert_eq!(report.gateway_payment_id, Some(42));
        assert_eq!(report.failure_reason, None);
    }

    #[test]
    fn test_amount_mismatch_fails_the_payment() {
        let report = StatusReport::from_gateway(
            &payload("success", 5, "UAH"),
            false,
            ReportSource::Callback,
        )
        .checked_against(&payment());
        assert_eq!(report.status, PaymentStatus::Failed);
        assert!(report.failure_reason.unwrap().starts_with("amount mismatch"));
    }

    #[test]
    fn test_currency_mismatch_fails_the_payment() {
        let report = StatusReport::from_gateway(
            &payload("success", 500, "USD"),
            false,
            ReportSource::StatusPoll,
        )
        .checked_against(&payment());
        assert_eq!(report.status, PaymentStatus::Failed);
    }

    #[test]
    fn test_failure_carries_gateway_reason() {
        let mut raw = payload("failure", 500, "UAH");
        raw.err_description = Some("insufficient funds".to_string());
        let report = StatusReport::from_gateway(&raw, false, ReportSource::Callback);
        assert_eq!(report.status, PaymentStatus::Failed);
        assert_eq!(report.failure_reason.as_deref(), Some("insufficient funds"));
    }

    #[test]
    fn test_sandbox_outside_sandbox_mode_is_a_failure() {
        let raw = payload("sandbox", 500, "UAH");
        let report = StatusReport::from_gateway(&raw, false, ReportSource::Callback);
        assert_eq!(report.status, PaymentStatus::Failed);
        assert!(report.failure_reason.is_some());

        let report = StatusReport::from_gateway(&raw, true, ReportSource::Callback)
            .checked_against(&payment());
        assert_eq!(report.status, PaymentStatus::Success);
    }

    #[test]
    fn test_unknown_status_stays_pending() {
        let report = StatusReport::from_gateway(
            &payload("brand_new_status", 500, "UAH"),
            false,
            ReportSource::Callback,
        );
        assert_eq!(report.status, PaymentStatus::Pending);
        assert_eq!(report.gateway_status.as_deref(), Some("brand_new_status"));
    }
}
