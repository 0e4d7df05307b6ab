use sqlx::PgPool;

/// Entry point for every database query.
///
/// Queries are plain structs; each one implements
/// `kanau::processor::Processor` for this type.
#[derive(Clone)]
pub struct DatabaseProcessor {
    pub pool: PgPool,
}

impl DatabaseProcessor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a transaction for multi-statement updates.
    pub async fn begin(&self) -> Result<sqlx::Transaction<'static, sqlx::Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}
