use crate::entities::RegistrationKind;
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RegistrationRecord {
    pub id: i64,
    pub competition_id: Uuid,
    pub user_id: Uuid,
    pub club_id: Option<Uuid>,
    pub kind: RegistrationKind,
    pub participant_name: Option<String>,
    pub headcount: i32,
    pub payment_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

/// Data for inserting a registration paid by a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationInsert {
    pub competition_id: Uuid,
    pub user_id: Uuid,
    pub club_id: Option<Uuid>,
    pub kind: RegistrationKind,
    pub participant_name: Option<String>,
    pub headcount: i32,
    pub payment_id: Uuid,
}

impl RegistrationRecord {
    /// Insert the registration for a payment within a transaction.
    ///
    /// Returns `None` when the payment already has a registration.
    pub async fn insert_for_payment_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        insert: &RegistrationInsert,
    ) -> Result<Option<RegistrationRecord>, sqlx::Error> {
        sqlx::query_as::<_, RegistrationRecord>(
            r#"
            INSERT INTO registrations
                (competition_id, user_id, club_id, kind, participant_name, headcount, payment_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (payment_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(insert.competition_id)
        .bind(insert.user_id)
        .bind(insert.club_id)
        .bind(insert.kind)
        .bind(insert.participant_name.as_deref())
        .bind(insert.headcount)
        .bind(insert.payment_id)
        .fetch_optional(&mut **tx)
        .await
    }
}

#[derive(Debug, Clone)]
/// Paginated registrations of one competition.
pub struct ListRegistrations {
    pub competition_id: Uuid,
    pub kind: Option<RegistrationKind>,
    pub limit: i64,
    pub offset: i64,
}

impl Processor<ListRegistrations> for DatabaseProcessor {
    type Output = Vec<RegistrationRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListRegistrations")]
    async fn process(
        &self,
        query: ListRegistrations,
    ) -> Result<Vec<RegistrationRecord>, sqlx::Error> {
        sqlx::query_as::<_, RegistrationRecord>(
            r#"
            SELECT * FROM registrations
            WHERE competition_id = $1
              AND ($2::registration_kind IS NULL OR kind = $2)
            ORDER BY created_at ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(query.competition_id)
        .bind(query.kind)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await
    }
}
