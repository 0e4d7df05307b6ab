use crate::entities::UserRole;
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub club_id: Option<Uuid>,
    pub role: UserRole,
    pub membership_expires_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl UserRecord {
    /// Extend a membership by `days`, counting from the later of now and the
    /// current expiry. Returns the new expiry.
    pub async fn extend_membership_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
        days: i32,
    ) -> Result<OffsetDateTime, sqlx::Error> {
        sqlx::query_scalar::<_, OffsetDateTime>(
            r#"
            UPDATE users
            SET membership_expires_at =
                GREATEST(COALESCE(membership_expires_at, now()), now()) + make_interval(days => $2)
            WHERE id = $1
            RETURNING membership_expires_at
            "#,
        )
        .bind(user_id)
        .bind(days)
        .fetch_one(&mut **tx)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct GetUserById {
    pub id: Uuid,
}

impl Processor<GetUserById> for DatabaseProcessor {
    type Output = Option<UserRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetUserById")]
    async fn process(&self, query: GetUserById) -> Result<Option<UserRecord>, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE id = $1")
            .bind(query.id)
            .fetch_optional(&self.pool)
            .await
    }
}
