use crate::entities::{PaymentPurpose, PaymentStatus};
use crate::framework::DatabaseProcessor;
use fedportal_sdk::objects::RegistrationDetails;
use kanau::processor::Processor;
use rust_decimal::Decimal;
use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub order_id: String,
    pub user_id: Uuid,
    pub purpose: PaymentPurpose,
    pub competition_id: Option<Uuid>,
    pub registration: Option<Json<RegistrationDetails>>,
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub status: PaymentStatus,
    pub gateway_status: Option<String>,
    pub gateway_payment_id: Option<i64>,
    pub failure_reason: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    pub settled_at: Option<OffsetDateTime>,
}

impl PaymentRecord {
    pub fn is_overdue(&self, now: OffsetDateTime) -> bool {
        self.expires_at < now
    }

    /// Lock a payment row for the rest of the transaction.
    pub async fn lock_by_id_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
    ) -> Result<Option<PaymentRecord>, sqlx::Error> {
        sqlx::query_as::<_, PaymentRecord>("SELECT * FROM payments WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Write a status change within a transaction.
    ///
    /// `settled_at` is stamped the first time a payment reaches `success`.
    pub async fn update_status_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
        update: &PaymentStatusUpdate,
    ) -> Result<PaymentRecord, sqlx::Error> {
        sqlx::query_as::<_, PaymentRecord>(
            r#"
            UPDATE payments
            SET status = $2,
                gateway_status = COALESCE($3, gateway_status),
                gateway_payment_id = COALESCE($4, gateway_payment_id),
                failure_reason = $5,
                updated_at = now(),
                settled_at = CASE WHEN $2 = 'success'::payment_status
                                  THEN COALESCE(settled_at, now())
                                  ELSE settled_at END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.status)
        .bind(update.gateway_status.as_deref())
        .bind(update.gateway_payment_id)
        .bind(update.failure_reason.as_deref())
        .fetch_one(&mut **tx)
        .await
    }
}

/// Fields written on a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentStatusUpdate {
    pub status: PaymentStatus,
    pub gateway_status: Option<String>,
    pub gateway_payment_id: Option<i64>,
    pub failure_reason: Option<String>,
}

#[derive(Debug, Clone)]
/// Insert a new pending payment.
pub struct InsertPayment {
    pub id: Uuid,
    pub order_id: String,
    pub user_id: Uuid,
    pub purpose: PaymentPurpose,
    pub competition_id: Option<Uuid>,
    pub registration: Option<RegistrationDetails>,
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub expires_at: OffsetDateTime,
}

impl Processor<InsertPayment> for DatabaseProcessor {
    type Output = PaymentRecord;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertPayment")]
    async fn process(&self, insert: InsertPayment) -> Result<PaymentRecord, sqlx::Error> {
        sqlx::query_as::<_, PaymentRecord>(
            r#"
            INSERT INTO payments
                (id, order_id, user_id, purpose, competition_id, registration,
                 amount, currency, description, status, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending', $10)
            RETURNING *
            "#,
        )
        .bind(insert.id)
        .bind(insert.order_id)
        .bind(insert.user_id)
        .bind(insert.purpose)
        .bind(insert.competition_id)
        .bind(insert.registration.map(Json))
        .bind(insert.amount)
        .bind(insert.currency)
        .bind(insert.description)
        .bind(insert.expires_at)
        .fetch_one(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct GetPaymentById {
    pub id: Uuid,
}

impl Processor<GetPaymentById> for DatabaseProcessor {
    type Output = Option<PaymentRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetPaymentById")]
    async fn process(&self, query: GetPaymentById) -> Result<Option<PaymentRecord>, sqlx::Error> {
        sqlx::query_as::<_, PaymentRecord>("SELECT * FROM payments WHERE id = $1")
            .bind(query.id)
            .fetch_optional(&self.pool)
            .await
    }
}

#[derive(Debug, Clone)]
/// Look a payment up by the order id we sent to LiqPay.
pub struct GetPaymentByOrderId {
    pub order_id: String,
}

impl Processor<GetPaymentByOrderId> for DatabaseProcessor {
    type Output = Option<PaymentRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetPaymentByOrderId")]
    async fn process(
        &self,
        query: GetPaymentByOrderId,
    ) -> Result<Option<PaymentRecord>, sqlx::Error> {
        sqlx::query_as::<_, PaymentRecord>("SELECT * FROM payments WHERE order_id = $1")
            .bind(query.order_id)
            .fetch_optional(&self.pool)
            .await
    }
}

#[derive(Debug, Clone)]
/// Paginated payment listing for the admin API.
pub struct ListPayments {
    pub limit: i64,
    pub offset: i64,
    pub status: Option<PaymentStatus>,
    pub user_id: Option<Uuid>,
    pub competition_id: Option<Uuid>,
}

impl Processor<ListPayments> for DatabaseProcessor {
    type Output = Vec<PaymentRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListPayments")]
    async fn process(&self, query: ListPayments) -> Result<Vec<PaymentRecord>, sqlx::Error> {
        sqlx::query_as::<_, PaymentRecord>(
            r#"
            SELECT * FROM payments
            WHERE ($1::payment_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::uuid IS NULL OR competition_id = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(query.status)
        .bind(query.user_id)
        .bind(query.competition_id)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await
    }
}

/// Count and volume of payments in one status.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PaymentStatusTotals {
    pub status: PaymentStatus,
    pub count: i64,
    pub total: Decimal,
}

#[derive(Debug, Clone)]
pub struct GetPaymentTotals;

impl Processor<GetPaymentTotals> for DatabaseProcessor {
    type Output = Vec<PaymentStatusTotals>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetPaymentTotals")]
    async fn process(&self, _: GetPaymentTotals) -> Result<Vec<PaymentStatusTotals>, sqlx::Error> {
        sqlx::query_as::<_, PaymentStatusTotals>(
            r#"
            SELECT status, COUNT(*) AS count, COALESCE(SUM(amount), 0) AS total
            FROM payments
            GROUP BY status
            ORDER BY status
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Expire every `pending` payment whose deadline has passed.
///
/// Runs as a single statement so that rows locked by an in-flight callback
/// are re-checked after the lock is released.
pub struct ExpireOverduePayments {
    pub now: OffsetDateTime,
}

impl Processor<ExpireOverduePayments> for DatabaseProcessor {
    type Output = Vec<Uuid>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ExpireOverduePayments")]
    async fn process(&self, query: ExpireOverduePayments) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE payments
            SET status = 'expired', updated_at = now()
            WHERE status = 'pending' AND expires_at < $1
            RETURNING id
            "#,
        )
        .bind(query.now)
        .fetch_all(&self.pool)
        .await
    }
}
