use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ClubRecord {
    pub id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub manager_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct GetClubById {
    pub id: Uuid,
}

impl Processor<GetClubById> for DatabaseProcessor {
    type Output = Option<ClubRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetClubById")]
    async fn process(&self, query: GetClubById) -> Result<Option<ClubRecord>, sqlx::Error> {
        sqlx::query_as::<_, ClubRecord>("SELECT * FROM clubs WHERE id = $1")
            .bind(query.id)
            .fetch_optional(&self.pool)
            .await
    }
}
