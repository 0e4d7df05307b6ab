//! Fee and lifetime settings for payments.

use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct PaymentsConfig {
    /// ISO 4217 code used for membership payments.
    pub currency: String,
    /// Yearly membership fee.
    pub membership_fee: Decimal,
    /// How long one membership payment extends a membership.
    pub membership_period_days: i32,
    /// How long a created payment stays payable.
    pub payment_ttl: time::Duration,
    /// How often overdue payments are swept to `expired`.
    pub expiry_sweep_interval: std::time::Duration,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            currency: "UAH".to_string(),
            membership_fee: Decimal::new(500, 0),
            membership_period_days: 365,
            payment_ttl: time::Duration::minutes(30),
            expiry_sweep_interval: std::time::Duration::from_secs(60),
        }
    }
}
