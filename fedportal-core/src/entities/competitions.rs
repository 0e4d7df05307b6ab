use crate::entities::CompetitionStatus;
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CompetitionRecord {
    pub id: Uuid,
    pub title: String,
    pub location: Option<String>,
    pub starts_on: time::Date,
    pub registration_deadline: OffsetDateTime,
    pub status: CompetitionStatus,
    pub individual_fee: Decimal,
    pub preliminary_fee: Decimal,
    pub currency: String,
    pub registrations_count: i32,
    pub paid_total: Decimal,
    pub created_at: OffsetDateTime,
}

impl CompetitionRecord {
    /// Open and before its registration deadline.
    pub fn accepts_registrations(&self, now: OffsetDateTime) -> bool {
        self.status == CompetitionStatus::Open && now < self.registration_deadline
    }

    /// Count a paid registration towards the competition totals.
    pub async fn record_paid_registration_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
        amount: Decimal,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE competitions
            SET registrations_count = registrations_count + 1,
                paid_total = paid_total + $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(amount)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct GetCompetitionById {
    pub id: Uuid,
}

impl Processor<GetCompetitionById> for DatabaseProcessor {
    type Output = Option<CompetitionRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetCompetitionById")]
    async fn process(
        &self,
        query: GetCompetitionById,
    ) -> Result<Option<CompetitionRecord>, sqlx::Error> {
        sqlx::query_as::<_, CompetitionRecord>("SELECT * FROM competitions WHERE id = $1")
            .bind(query.id)
            .fetch_optional(&self.pool)
            .await
    }
}

#[derive(Debug, Clone)]
/// List competitions, hiding drafts unless asked for explicitly.
pub struct ListCompetitions {
    pub status: Option<CompetitionStatus>,
}

impl Processor<ListCompetitions> for DatabaseProcessor {
    type Output = Vec<CompetitionRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListCompetitions")]
    async fn process(&self, query: ListCompetitions) -> Result<Vec<CompetitionRecord>, sqlx::Error> {
        sqlx::query_as::<_, CompetitionRecord>(
            r#"
            SELECT * FROM competitions
            WHERE ($1::competition_status IS NULL AND status <> 'draft')
               OR status = $1
            ORDER BY starts_on ASC
            "#,
        )
        .bind(query.status)
        .fetch_all(&self.pool)
        .await
    }
}
