use axum::{Json, extract::State, response::IntoResponse};
use fedportal_core::entities::PaymentStatus;
use fedportal_core::entities::payments::{GetPaymentTotals, PaymentStatusTotals};
use fedportal_sdk::objects::admin::{AdminStatsResponse, StatusBucket};
use kanau::processor::Processor;
use rust_decimal::Decimal;

use crate::api::ApiError;
use crate::api::extractors::AdminAuth;
use crate::state::AppState;

/// `GET /stats`: payment counts and volume per status.
pub async fn stats(
    State(state): State<AppState>,
    _auth: AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    let totals = state.db.process(GetPaymentTotals).await?;
    Ok(Json(summarize(&totals)))
}

fn summarize(totals: &[PaymentStatusTotals]) -> AdminStatsResponse {
    let collected = totals
        .iter()
        .filter(|t| t.status == PaymentStatus::Success)
        .map(|t| t.total)
        .sum::<Decimal>();
    AdminStatsResponse {
        buckets: totals
            .iter()
            .map(|t| StatusBucket {
                status: t.status.into(),
                count: t.count,
                total: t.total,
            })
            .collect(),
        collected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collected_counts_only_successful_payments() {
        let totals = [
            PaymentStatusTotals {
                status: PaymentStatus::Success,
                count: 3,
                total: Decimal::new(1500, 0),
            },
            PaymentStatusTotals {
                status: PaymentStatus::Expired,
                count: 2,
                total: Decimal::new(900, 0),
            },
        ];
        let stats = summarize(&totals);
        assert_eq!(stats.collected, Decimal::new(1500, 0));
        assert_eq!(stats.buckets.len(), 2);
        assert_eq!(stats.buckets[1].count, 2);
    }

    #[test]
    fn test_empty_database() {
        let stats = summarize(&[]);
        assert_eq!(stats.collected, Decimal::ZERO);
        assert!(stats.buckets.is_empty());
    }
}
