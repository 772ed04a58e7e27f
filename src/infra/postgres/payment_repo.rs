use {
    crate::domain::{
        error::LedgerError,
        money::{Currency, Money, MoneyAmount},
        payment::{NewPayment, Payment, PaymentStatus, SessionId, UpsertOutcome},
    },
    chrono::{DateTime, Utc},
    sqlx::PgPool,
    uuid::Uuid,
};

/// Atomic create-or-update keyed on the unique session id.
///
/// One conditional write: the unique constraint arbitrates racing
/// deliveries at the storage layer, so there is no read-then-write window.
/// `xmax = 0` holds only for rows created by this statement, which is how an
/// insert is told apart from a converging update. The update arm leaves
/// `customer_email` and `created_at` untouched — both are set at creation
/// only.
pub async fn upsert_completed(
    pool: &PgPool,
    payment: &NewPayment,
) -> Result<UpsertOutcome, LedgerError> {
    let (id, inserted): (Uuid, bool) = sqlx::query_as(
        r#"
        INSERT INTO payments (id, stripe_session_id, amount, currency, status, customer_email)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (stripe_session_id) DO UPDATE
        SET status = EXCLUDED.status,
            amount = EXCLUDED.amount,
            currency = EXCLUDED.currency,
            updated_at = now()
        RETURNING id, (xmax = 0) AS inserted
        "#,
    )
    .bind(payment.id())
    .bind(payment.session_id().as_str())
    .bind(payment.money().amount().cents())
    .bind(payment.money().currency().as_str())
    .bind(payment.status().as_str())
    .bind(payment.customer_email())
    .fetch_one(pool)
    .await?;

    Ok(if inserted {
        UpsertOutcome::Created(id)
    } else {
        UpsertOutcome::Updated(id)
    })
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    stripe_session_id: String,
    amount: i64,
    currency: String,
    status: String,
    customer_email: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = LedgerError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: row.id,
            session_id: SessionId::new(row.stripe_session_id)?,
            money: Money::new(
                MoneyAmount::new(row.amount)?,
                Currency::new(row.currency)?,
            ),
            status: PaymentStatus::try_from(row.status.as_str())?,
            customer_email: row.customer_email,
            created_at: row.created_at,
        })
    }
}

/// One page, newest first. `id` breaks timestamp ties so pages are stable.
pub async fn list_page(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<Payment>, LedgerError> {
    let rows: Vec<PaymentRow> = sqlx::query_as(
        r#"
        SELECT id, stripe_session_id, amount, currency, status, customer_email, created_at
        FROM payments
        ORDER BY created_at DESC, id DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Payment::try_from).collect()
}

pub async fn count_all(pool: &PgPool) -> Result<i64, LedgerError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Sum of every recorded amount, zero for an empty table.
pub async fn sum_amounts(pool: &PgPool) -> Result<MoneyAmount, LedgerError> {
    let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0)::BIGINT FROM payments")
        .fetch_one(pool)
        .await?;
    MoneyAmount::new(total)
}
