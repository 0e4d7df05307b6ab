//! Effects of a payment reaching `success`.
//!
//! Always called inside the transaction that writes the `success` status,
//! so a payment is settled exactly once.

use crate::entities::PaymentPurpose;
use crate::entities::competitions::CompetitionRecord;
use crate::entities::payments::PaymentRecord;
use crate::entities::registrations::{RegistrationInsert, RegistrationRecord};
use crate::entities::users::UserRecord;
use crate::lifecycle::LifecycleError;
use time::OffsetDateTime;
use tracing::{info, warn};

/// What settling a payment did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// A competition registration was created. `None` when one already
    /// existed for the payment.
    Registration { registration_id: Option<i64> },
    /// The payer's membership was extended.
    Membership { expires_at: OffsetDateTime },
}

pub(crate) async fn settle_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    payment: &PaymentRecord,
    membership_period_days: i32,
) -> Result<Settlement, LifecycleError> {
    match payment.purpose {
        PaymentPurpose::Competition => {
            let insert = registration_insert(payment)?;
            let created = RegistrationRecord::insert_for_payment_tx(tx, &insert).await?;
            match &created {
                Some(registration) => {
                    CompetitionRecord::record_paid_registration_tx(
                        tx,
                        insert.competition_id,
                        payment.amount,
                    )
                    .await?;
                    info!(
                        payment_id = %payment.id,
                        competition_id = %insert.competition_id,
                        registration_id = registration.id,
                        "Registration created"
                    );
                }
                None => warn!(
                    payment_id = %payment.id,
                    "Registration for payment already exists"
                ),
            }
            Ok(Settlement::Registration {
                registration_id: created.map(|r| r.id),
            })
        }
        PaymentPurpose::Membership => {
            let expires_at =
                UserRecord::extend_membership_tx(tx, payment.user_id, membership_period_days)
                    .await?;
            info!(
                payment_id = %payment.id,
                user_id = %payment.user_id,
                membership_expires_at = %expires_at,
                "Membership extended"
            );
            Ok(Settlement::Membership { expires_at })
        }
    }
}

fn registration_insert(payment: &PaymentRecord) -> Result<RegistrationInsert, LifecycleError> {
    let competition_id = payment
        .competition_id
        .ok_or(LifecycleError::Inconsistent {
            payment_id: payment.id,
            reason: "competition payment without competition_id",
        })?;
    let details = payment
        .registration
        .as_ref()
        .map(|json| &json.0)
        .ok_or(LifecycleError::Inconsistent {
            payment_id: payment.id,
            reason: "competition payment without registration details",
        })?;
    Ok(RegistrationInsert {
        competition_id,
        user_id: payment.user_id,
        club_id: details.club_id,
        kind: details.kind.into(),
        participant_name: details.participant_name.clone(),
        headcount: details.headcount.unwrap_or(1),
        payment_id: payment.id,
    })
}
