//! Server-side pricing of payments.
//!
//! Amounts are never taken from the client: membership fees come from the
//! configuration, competition fees from the competition row.

use fedportal_sdk::objects::{RegistrationDetails, RegistrationKind};
use rust_decimal::Decimal;
use thiserror::Error;
use time::OffsetDateTime;

use crate::config::PaymentsConfig;
use crate::entities::competitions::CompetitionRecord;

/// Upper bound on a single preliminary headcount.
pub const MAX_HEADCOUNT: i32 = 500;

/// Why a payment cannot be priced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    #[error("competition is not open for registration")]
    RegistrationClosed,
    #[error("registration details are required for competition payments")]
    MissingRegistration,
    #[error("participant_name is required for individual registration")]
    MissingParticipantName,
    #[error("club_id is required for preliminary registration")]
    MissingClub,
    #[error("headcount must be between 1 and {MAX_HEADCOUNT}")]
    InvalidHeadcount,
    #[error("payment amount must be positive")]
    NonPositiveAmount,
}

/// A priced payment, ready to be persisted and sent to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    /// Normalized sign-up details, stored with competition payments.
    pub registration: Option<RegistrationDetails>,
}

pub fn membership_quote(config: &PaymentsConfig) -> Result<Quote, QuoteError> {
    Ok(Quote {
        amount: payable_amount(config.membership_fee)?,
        currency: config.currency.clone(),
        description: format!(
            "Federation membership fee ({} days)",
            config.membership_period_days
        ),
        registration: None,
    })
}

pub fn competition_quote(
    competition: &CompetitionRecord,
    details: Option<RegistrationDetails>,
    now: OffsetDateTime,
) -> Result<Quote, QuoteError> {
    if !competition.accepts_registrations(now) {
        return Err(QuoteError::RegistrationClosed);
    }
    let details = details.ok_or(QuoteError::MissingRegistration)?;

    let (amount, description, registration) = match details.kind {
        RegistrationKind::Individual => {
            let name = details
                .participant_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or(QuoteError::MissingParticipantName)?
                .to_string();
            let description = format!("{}: individual registration ({name})", competition.title);
            let registration = RegistrationDetails {
                kind: RegistrationKind::Individual,
                club_id: details.club_id,
                participant_name: Some(name),
                headcount: Some(1),
            };
            (competition.individual_fee, description, registration)
        }
        RegistrationKind::Preliminary => {
            let club_id = details.club_id.ok_or(QuoteError::MissingClub)?;
            let headcount = details.headcount.unwrap_or(0);
            if !(1..=MAX_HEADCOUNT).contains(&headcount) {
                return Err(QuoteError::InvalidHeadcount);
            }
            let description = format!(
                "{}: preliminary registration ({headcount} participants)",
                competition.title
            );
            let registration = RegistrationDetails {
                kind: RegistrationKind::Preliminary,
                club_id: Some(club_id),
                participant_name: None,
                headcount: Some(headcount),
            };
            (
                competition.preliminary_fee * Decimal::from(headcount),
                description,
                registration,
            )
        }
    };

    Ok(Quote {
        amount: payable_amount(amount)?,
        currency: competition.currency.clone(),
        description,
        registration: Some(registration),
    })
}

/// Round to kopecks; whatever is left must still be worth charging.
fn payable_amount(amount: Decimal) -> Result<Decimal, QuoteError> {
    let amount = amount.round_dp(2);
    if amount <= Decimal::ZERO {
        return Err(QuoteError::NonPositiveAmount);
    }
    Ok(amount)
}
