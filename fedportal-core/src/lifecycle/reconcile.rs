use crate::entities::PaymentStatus;
use crate::entities::payments::PaymentRecord;
use crate::framework::DatabaseProcessor;
use crate::gateway::PaymentGateway;
use crate::lifecycle::{
    ApplyOutcome, ApplyStatusReport, LifecycleError, ReportSource, StatusReport,
};
use fedportal_sdk::objects::CallbackPayload;
use kanau::processor::Processor;
use time::OffsetDateTime;
use tracing::{debug, warn};

/// Result of asking the gateway about a payment.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub payment: PaymentRecord,
    /// Whether the gateway answered.
    pub reconciled: bool,
    pub outcome: Option<ApplyOutcome>,
}

impl Reconciliation {
    fn untouched(payment: PaymentRecord) -> Self {
        Self {
            payment,
            reconciled: false,
            outcome: None,
        }
    }
}

/// Whether a payment in `status` is worth polling the gateway for.
///
/// `force` also polls expired payments, which may still have been paid.
pub fn should_poll(status: PaymentStatus, force: bool) -> bool {
    match status {
        PaymentStatus::Pending | PaymentStatus::Processing => true,
        PaymentStatus::Expired => force,
        PaymentStatus::Success | PaymentStatus::Failed | PaymentStatus::Cancelled => false,
    }
}

/// What a `status` answer means for `payment`, or `None` when there is
/// nothing to apply.
///
/// `payment_not_found` only expires a payment whose deadline has passed;
/// before that the payer may still be on the checkout page.
pub fn poll_report(
    payment: &PaymentRecord,
    response: &CallbackPayload,
    sandbox: bool,
    now: OffsetDateTime,
) -> Option<StatusReport> {
    if !response.is_payment_not_found() {
        return Some(StatusReport::from_gateway(response, sandbox, ReportSource::StatusPoll));
    }
    if !payment.is_overdue(now) || payment.status == PaymentStatus::Expired {
        return None;
    }
    Some(StatusReport::internal(
        PaymentStatus::Expired,
        Some("payment was never completed at the gateway".to_string()),
        ReportSource::StatusPoll,
    ))
}

/// Poll the gateway for `payment` and apply what it reports.
///
/// Gateway failures are logged and leave the payment untouched with
/// `reconciled = false`. An order the gateway has never seen is expired
/// once its deadline has passed.
pub async fn reconcile_payment(
    db: &DatabaseProcessor,
    gateway: &dyn PaymentGateway,
    payment: PaymentRecord,
    membership_period_days: i32,
    force: bool,
    now: OffsetDateTime,
) -> Result<Reconciliation, LifecycleError> {
    if !should_poll(payment.status, force) {
        debug!(order_id = %payment.order_id, status = ?payment.status, "Skipping gateway poll");
        return Ok(Reconciliation::untouched(payment));
    }

    let response = match gateway.fetch_status(&payment.order_id).await {
        Ok(response) => response,
        Err(e) => {
            warn!(order_id = %payment.order_id, error = %e, "LiqPay status request failed");
            return Ok(Reconciliation::untouched(payment));
        }
    };

    let sandbox = gateway.sandbox().await;
    let Some(report) = poll_report(&payment, &response, sandbox, now) else {
        return Ok(Reconciliation {
            payment,
            reconciled: true,
            outcome: None,
        });
    };

    let outcome = db
        .process(ApplyStatusReport {
            payment_id: payment.id,
            report,
            membership_period_days,
        })
        .await?;
    Ok(Reconciliation {
        payment: outcome.payment.clone(),
        reconciled: true,
        outcome: Some(outcome),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PaymentPurpose;
    use crate::gateway::{Checkout, CheckoutOrder, GatewayError};
    use async_trait::async_trait;
    use fedportal_sdk::signature::SignedPayload;
    use rust_decimal::Decimal;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use time::macros::datetime;
    use uuid::Uuid;

    const CREATED: OffsetDateTime = datetime!(2026-10-19 10:00 UTC);
    const EXPIRES: OffsetDateTime = datetime!(2026-10-19 10:30 UTC);

    fn payment(status: PaymentStatus) -> PaymentRecord {
        PaymentRecord {
            id: Uuid::from_u128(7),
            order_id: "fp-7".to_string(),
            user_id: Uuid::nil(),
            purpose: PaymentPurpose::Membership,
            competition_id: None,
            registration: None,
            amount: Decimal::new(500, 0),
            currency: "UAH".to_string(),
            description: "Federation membership fee (365 days)".to_string(),
            status,
            gateway_status: None,
            gateway_payment_id: None,
            failure_reason: None,
            created_at: CREATED,
            updated_at: CREATED,
            expires_at: EXPIRES,
            settled_at: None,
        }
    }

    fn not_found() -> CallbackPayload {
        serde_json::from_value(serde_json::json!({
            "result": "error",
            "status": "error",
            "err_code": "payment_not_found",
            "err_description": "payment_not_found"
        }))
        .unwrap()
    }

    /// Answers every status request the same way and counts the calls.
    struct ScriptedGateway {
        answer: Option<CallbackPayload>,
        calls: AtomicUsize,
    }

    impl ScriptedGateway {
        fn answering(answer: CallbackPayload) -> Self {
            Self {
                answer: Some(answer),
                calls: AtomicUsize::new(0),
            }
        }

        fn down() -> Self {
            Self {
                answer: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PaymentGateway for ScriptedGateway {
        async fn checkout(&self, _: CheckoutOrder) -> Result<Checkout, GatewayError> {
            unimplemented!("not used by reconciliation")
        }

        async fn verify_callback(&self, _: &SignedPayload) -> Result<CallbackPayload, GatewayError> {
            unimplemented!("not used by reconciliation")
        }

        async fn fetch_status(&self, _: &str) -> Result<CallbackPayload, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone().ok_or_else(|| GatewayError::Api {
                code: "err_connection".to_string(),
                description: "gateway unreachable".to_string(),
            })
        }

        async fn sandbox(&self) -> bool {
            false
        }
    }

    /// A pool that is never connected; the cases below stop before SQL.
    fn unreachable_db() -> DatabaseProcessor {
        DatabaseProcessor::new(
            PgPoolOptions::new()
                .connect_lazy("postgres://fedportal@localhost/fedportal")
                .unwrap(),
        )
    }

    #[test]
    fn test_only_open_payments_are_polled() {
        assert!(should_poll(PaymentStatus::Pending, false));
        assert!(should_poll(PaymentStatus::Processing, false));
        assert!(!should_poll(PaymentStatus::Expired, false));
        assert!(!should_poll(PaymentStatus::Success, true));
        assert!(!should_poll(PaymentStatus::Cancelled, true));
    }

    #[test]
    fn test_forced_poll_revisits_expired_payments() {
        assert!(should_poll(PaymentStatus::Expired, true));
    }

    #[test]
    fn test_unknown_order_before_deadline_is_left_alone() {
        let payment = payment(PaymentStatus::Pending);
        assert_eq!(
            poll_report(&payment, &not_found(), false, datetime!(2026-10-19 10:10 UTC)),
            None
        );
    }

    #[test]
    fn test_unknown_order_after_deadline_expires() {
        let payment = payment(PaymentStatus::Pending);
        let report =
            poll_report(&payment, &not_found(), false, datetime!(2026-10-19 11:00 UTC)).unwrap();
        assert_eq!(report.status, PaymentStatus::Expired);
        assert_eq!(report.source, ReportSource::StatusPoll);
        assert!(report.failure_reason.is_some());
    }

    #[test]
    fn test_unknown_order_already_expired_is_not_reapplied() {
        let payment = payment(PaymentStatus::Expired);
        assert_eq!(
            poll_report(&payment, &not_found(), false, datetime!(2026-10-19 11:00 UTC)),
            None
        );
    }

    #[test]
    fn test_gateway_answer_is_mapped() {
        let response: CallbackPayload = serde_json::from_value(serde_json::json!({
            "status": "success",
            "order_id": "fp-7",
            "amount": 500,
            "currency": "UAH",
            "payment_id": 1234
        }))
        .unwrap();
        let report = poll_report(
            &payment(PaymentStatus::Pending),
            &response,
            false,
            datetime!(2026-10-19 10:10 UTC),
        )
        .unwrap();
        assert_eq!(report.status, PaymentStatus::Success);
        assert_eq!(report.gateway_payment_id, Some(1234));
    }

    #[tokio::test]
    async fn test_gateway_failure_leaves_payment_untouched() {
        let gateway = ScriptedGateway::down();
        let payment = payment(PaymentStatus::Pending);
        let result = reconcile_payment(
            &unreachable_db(),
            &gateway,
            payment.clone(),
            365,
            false,
            datetime!(2026-10-19 11:00 UTC),
        )
        .await
        .unwrap();
        assert!(!result.reconciled);
        assert!(result.outcome.is_none());
        assert_eq!(result.payment, payment);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_order_before_deadline_is_reconciled_without_change() {
        let gateway = ScriptedGateway::answering(not_found());
        let payment = payment(PaymentStatus::Pending);
        let result = reconcile_payment(
            &unreachable_db(),
            &gateway,
            payment.clone(),
            365,
            false,
            datetime!(2026-10-19 10:10 UTC),
        )
        .await
        .unwrap();
        assert!(result.reconciled);
        assert!(result.outcome.is_none());
        assert_eq!(result.payment, payment);
    }

    #[tokio::test]
    async fn test_settled_payment_is_not_polled() {
        let gateway = ScriptedGateway::down();
        let result = reconcile_payment(
            &unreachable_db(),
            &gateway,
            payment(PaymentStatus::Success),
            365,
            true,
            datetime!(2026-10-19 11:00 UTC),
        )
        .await
        .unwrap();
        assert!(!result.reconciled);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }
}
