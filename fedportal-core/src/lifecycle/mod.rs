//! Payment lifecycle: status reports, transitions and settlement.
//!
//! Every status change funnels through [`ApplyStatusReport`], which locks
//! the payment row, checks the transition and settles the payment in one
//! transaction. Concurrent reports for the same payment are serialized by
//! the row lock.

mod reconcile;
mod report;
mod settlement;
mod transition;

pub use reconcile::{Reconciliation, reconcile_payment};
pub use report::{ReportSource, StatusReport};
pub use settlement::Settlement;
pub use transition::{Transition, plan};

use crate::entities::PaymentStatus;
use crate::entities::payments::PaymentRecord;
use crate::events::NotificationEvent;
use crate::framework::DatabaseProcessor;
use crate::gateway::GatewayError;
use kanau::processor::Processor;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("payment {0} not found")]
    NotFound(Uuid),

    /// A stored payment is missing data it needs to settle.
    #[error("payment {payment_id} is inconsistent: {reason}")]
    Inconsistent {
        payment_id: Uuid,
        reason: &'static str,
    },

    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Apply a status report to a payment.
#[derive(Debug, Clone)]
pub struct ApplyStatusReport {
    pub payment_id: Uuid,
    pub report: StatusReport,
    /// Used when a membership payment settles.
    pub membership_period_days: i32,
}

/// Result of [`ApplyStatusReport`].
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    /// The payment after the report, unchanged for dropped reports.
    pub payment: PaymentRecord,
    pub previous: PaymentStatus,
    pub transition: Transition,
    pub settlement: Option<Settlement>,
}

impl ApplyOutcome {
    pub fn changed(&self) -> bool {
        self.transition == Transition::Apply
    }

    /// The notification owed to the payer, if the payment reached an
    /// outcome worth an email.
    pub fn notification(&self) -> Option<NotificationEvent> {
        if !self.changed() || self.payment.status == PaymentStatus::Processing {
            return None;
        }
        Some(NotificationEvent::PaymentStatusChanged {
            payment_id: self.payment.id,
            new_status: self.payment.status,
        })
    }
}

impl Processor<ApplyStatusReport> for DatabaseProcessor {
    type Output = ApplyOutcome;
    type Error = LifecycleError;
    #[tracing::instrument(skip_all, err, name = "SQL:ApplyStatusReport", fields(payment_id = %input.payment_id))]
    async fn process(&self, input: ApplyStatusReport) -> Result<ApplyOutcome, LifecycleError> {
        let mut tx = self.begin().await?;
        let current = PaymentRecord::lock_by_id_tx(&mut tx, input.payment_id)
            .await?
            .ok_or(LifecycleError::NotFound(input.payment_id))?;
        let previous = current.status;
        let report = input.report.checked_against(&current);
        let transition = plan(previous, report.status);

        match transition {
            Transition::Apply => {
                let payment =
                    PaymentRecord::update_status_tx(&mut tx, current.id, &report.to_update())
                        .await?;
                let settlement = if payment.status == PaymentStatus::Success {
                    Some(
                        settlement::settle_tx(&mut tx, &payment, input.membership_period_days)
                            .await?,
                    )
                } else {
                    None
                };
                tx.commit().await?;
                info!(
                    order_id = %payment.order_id,
                    from = ?previous,
                    to = ?payment.status,
                    source = %report.source,
                    "Payment status changed"
                );
                Ok(ApplyOutcome {
                    payment,
                    previous,
                    transition,
                    settlement,
                })
            }
            Transition::Unchanged | Transition::Rejected => {
                tx.rollback().await?;
                if transition == Transition::Rejected {
                    warn!(
                        order_id = %current.order_id,
                        from = ?previous,
                        to = ?report.status,
                        source = %report.source,
                        "Status transition rejected"
                    );
                }
                Ok(ApplyOutcome {
                    payment: current,
                    previous,
                    transition,
                    settlement: None,
                })
            }
        }
    }
}
