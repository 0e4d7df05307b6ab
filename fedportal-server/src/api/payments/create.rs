use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use fedportal_core::entities::PaymentPurpose;
use fedportal_core::entities::clubs::GetClubById;
use fedportal_core::entities::competitions::GetCompetitionById;
use fedportal_core::entities::payments::InsertPayment;
use fedportal_core::entities::users::{GetUserById, UserRecord};
use fedportal_core::gateway::CheckoutOrder;
use fedportal_core::pricing::{self, Quote};
use fedportal_sdk::objects::{
    CreatePaymentRequest, CreatePaymentResponse, PaymentPurpose as SdkPaymentPurpose,
    RegistrationKind,
};
use kanau::processor::Processor;
use time::OffsetDateTime;
use url::Url;
use uuid::Uuid;

use crate::api::ApiError;
use crate::state::AppState;

/// Order ids sent to LiqPay: `fp-` followed by a v7 UUID without dashes.
pub(crate) fn new_order_id(payment_id: Uuid) -> String {
    format!("fp-{}", payment_id.simple())
}

/// `POST /create`: start a payment.
///
/// The amount is always computed here; the request only says what is being
/// paid for.
pub(super) async fn create_payment(
    State(state): State<AppState>,
    Json(body): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result_url = body.result_url.as_deref().map(validate_result_url).transpose()?;
    if let Some(language) = body.language.as_deref() {
        if !matches!(language, "uk" | "en") {
            return Err(ApiError::BadRequest(
                "language must be \"uk\" or \"en\"".to_string(),
            ));
        }
    }

    let user = state
        .db
        .process(GetUserById { id: body.user_id })
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    let now = OffsetDateTime::now_utc();
    let payments = state.config.payments.snapshot().await;
    let quote = match body.purpose {
        SdkPaymentPurpose::Membership => pricing::membership_quote(&payments)?,
        SdkPaymentPurpose::Competition => {
            let competition_id = body.competition_id.ok_or_else(|| {
                ApiError::BadRequest("competition_id is required".to_string())
            })?;
            let competition = state
                .db
                .process(GetCompetitionById { id: competition_id })
                .await?
                .ok_or(ApiError::NotFound("competition"))?;
            pricing::competition_quote(&competition, body.registration.clone(), now)?
        }
    };
    ensure_may_register_club(&state, &user, &quote).await?;

    let payment_id = Uuid::now_v7();
    let order_id = new_order_id(payment_id);
    let expires_at = payment_expiry(now, payments.payment_ttl)?;

    let checkout = state
        .gateway
        .checkout(CheckoutOrder {
            order_id: order_id.clone(),
            amount: quote.amount,
            currency: quote.currency.clone(),
            description: quote.description.clone(),
            expires_at,
            result_url,
            language: body.language.clone(),
        })
        .await?;

    let purpose: PaymentPurpose = body.purpose.into();
    let record = state
        .db
        .process(InsertPayment {
            id: payment_id,
            order_id,
            user_id: user.id,
            purpose,
            competition_id: match purpose {
                PaymentPurpose::Competition => body.competition_id,
                PaymentPurpose::Membership => None,
            },
            registration: quote.registration,
            amount: quote.amount,
            currency: quote.currency,
            description: quote.description,
            expires_at,
        })
        .await?;

    tracing::info!(
        payment_id = %record.id,
        order_id = %record.order_id,
        user_id = %record.user_id,
        purpose = ?record.purpose,
        amount = %record.amount,
        "Payment created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatePaymentResponse {
            success: true,
            payment_id: record.id,
            order_id: record.order_id,
            checkout_url: checkout.checkout_url,
            data: checkout.payload.data,
            signature: checkout.payload.signature,
            amount: record.amount,
            currency: record.currency,
            expires_at: record.expires_at.unix_timestamp(),
        }),
    ))
}

fn payment_expiry(now: OffsetDateTime, ttl: time::Duration) -> Result<OffsetDateTime, ApiError> {
    now.checked_add(ttl)
        .ok_or_else(|| ApiError::Internal("payment ttl out of range".to_string()))
}

fn validate_result_url(raw: &str) -> Result<String, ApiError> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url.into()),
        _ => Err(ApiError::BadRequest(
            "result_url must be an absolute http(s) URL".to_string(),
        )),
    }
}

/// Only members or the manager of a club may pay its preliminary
/// registration.
async fn ensure_may_register_club(
    state: &AppState,
    user: &UserRecord,
    quote: &Quote,
) -> Result<(), ApiError> {
    let Some(details) = &quote.registration else {
        return Ok(());
    };
    if details.kind != RegistrationKind::Preliminary {
        return Ok(());
    }
    let Some(club_id) = details.club_id else {
        return Ok(());
    };
    let club = state
        .db
        .process(GetClubById { id: club_id })
        .await?
        .ok_or(ApiError::NotFound("club"))?;
    if user.club_id == Some(club.id) || club.manager_id == Some(user.id) {
        Ok(())
    } else {
        Err(ApiError::Forbidden("user does not belong to this club"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_format() {
        let id = Uuid::from_u128(0x0192f0c4_5f1e_7a54_9a0b_2f3c1d4e5f60);
        assert_eq!(new_order_id(id), "fp-0192f0c45f1e7a549a0b2f3c1d4e5f60");
    }

    #[test]
    fn test_result_url_must_be_http() {
        assert_eq!(
            validate_result_url("https://portal.example.org/done?x=1").unwrap(),
            "https://portal.example.org/done?x=1"
        );
        assert!(validate_result_url("javascript:alert(1)").is_err());
        assert!(validate_result_url("/relative").is_err());
    }

    #[test]
    fn test_payment_expiry() {
        let now = time::macros::datetime!(2026-10-19 10:00 UTC);
        assert_eq!(
            payment_expiry(now, time::Duration::minutes(30)).unwrap(),
            time::macros::datetime!(2026-10-19 10:30 UTC)
        );
        assert!(payment_expiry(now, time::Duration::MAX).is_err());
    }
}
