use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use voyage_core::payment::{Payment, PaymentStatus};
use voyage_core::repository::{PaymentStore, StoreError};
use voyage_core::reservation::ReservationStatus;

pub struct StorePaymentRepository {
    pool: PgPool,
}

impl StorePaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    reservation_id: Uuid,
    amount: f64,
    intent_id: String,
    client_secret: Option<String>,
    status: String,
    failure_reason: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl PaymentRow {
    fn into_payment(self) -> Result<Payment, StoreError> {
        Ok(Payment {
            id: self.id,
            reservation_id: self.reservation_id,
            amount: self.amount,
            intent_id: self.intent_id,
            client_secret: self.client_secret,
            status: PaymentStatus::parse(&self.status).ok_or_else(|| {
                voyage_core::CoreError::Internal(format!("unknown payment status '{}'", self.status))
            })?,
            failure_reason: self.failure_reason,
            created_at: self.created_at,
        })
    }
}

const SELECT_COLUMNS: &str =
    "id, reservation_id, amount, intent_id, client_secret, status, failure_reason, created_at";

#[async_trait]
impl PaymentStore for StorePaymentRepository {
    async fn insert(&self, payment: &Payment) -> Result<(), StoreError> {
        // The unique index on reservation_id backs the at-most-one-payment
        // invariant; violations surface as errors here.
        sqlx::query(
            r#"
            INSERT INTO payments (id, reservation_id, amount, intent_id, client_secret, status, failure_reason, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(payment.id)
        .bind(payment.reservation_id)
        .bind(payment.amount)
        .bind(&payment.intent_id)
        .bind(&payment.client_secret)
        .bind(payment.status.as_str())
        .bind(&payment.failure_reason)
        .bind(payment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_reservation(
        &self,
        reservation_id: Uuid,
    ) -> Result<Option<Payment>, StoreError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE reservation_id = $1",
            SELECT_COLUMNS
        ))
        .bind(reservation_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PaymentRow::into_payment).transpose()
    }

    async fn find_by_intent(&self, intent_id: &str) -> Result<Option<Payment>, StoreError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE intent_id = $1",
            SELECT_COLUMNS
        ))
        .bind(intent_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PaymentRow::into_payment).transpose()
    }

    async fn complete_and_confirm(&self, intent_id: &str) -> Result<Option<Payment>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE intent_id = $1 FOR UPDATE",
            SELECT_COLUMNS
        ))
        .bind(intent_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        sqlx::query("UPDATE payments SET status = $1 WHERE id = $2")
            .bind(PaymentStatus::Completed.as_str())
            .bind(row.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE reservations SET status = $1 WHERE id = $2 AND status = $3")
            .bind(ReservationStatus::Confirmed.as_str())
            .bind(row.reservation_id)
            .bind(ReservationStatus::Pending.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let mut payment = row.into_payment()?;
        payment.status = PaymentStatus::Completed;
        Ok(Some(payment))
    }

    async fn mark_failed(&self, intent_id: &str, reason: &str) -> Result<Option<Payment>, StoreError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "UPDATE payments SET status = $1, failure_reason = $2 WHERE intent_id = $3 RETURNING {}",
            SELECT_COLUMNS
        ))
        .bind(PaymentStatus::Failed.as_str())
        .bind(reason)
        .bind(intent_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PaymentRow::into_payment).transpose()
    }
}
