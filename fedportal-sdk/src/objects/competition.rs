//! Competition listing types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompetitionStatus {
    Draft,
    Open,
    Closed,
    Finished,
}

/// A competition as shown to members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionResponse {
    pub id: Uuid,
    pub title: String,
    pub location: Option<String>,
    /// ISO date, `YYYY-MM-DD`.
    pub starts_on: String,
    pub registration_deadline: i64,
    pub status: CompetitionStatus,
    pub individual_fee: Decimal,
    pub preliminary_fee: Decimal,
    pub currency: String,
    pub registrations_count: i32,
}

/// Query parameters for listing competitions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCompetitionsQuery {
    pub status: Option<CompetitionStatus>,
}
