use {
    crate::domain::{
        error::LedgerError,
        payment::{NewPayment, UpsertOutcome},
    },
    crate::infra::postgres::payment_repo,
    sqlx::PgPool,
};

/// Record a completed checkout session.
///
/// Idempotent with respect to redelivery: the store performs a single atomic
/// create-or-update keyed on the session id, so racing deliveries for the
/// same session can never both insert. A store failure propagates so the
/// provider's redelivery mechanism retries later; there is no local retry.
pub async fn record_completed_checkout(
    pool: &PgPool,
    payment: &NewPayment,
) -> Result<UpsertOutcome, LedgerError> {
    let outcome = payment_repo::upsert_completed(pool, payment).await?;

    match &outcome {
        UpsertOutcome::Created(id) => {
            tracing::info!(
                payment_id = %id,
                session_id = %payment.session_id(),
                amount = %payment.money().amount(),
                currency = %payment.money().currency(),
                "payment recorded"
            );
        }
        UpsertOutcome::Updated(id) => {
            tracing::info!(
                payment_id = %id,
                session_id = %payment.session_id(),
                "redelivered session, payment converged"
            );
        }
    }

    Ok(outcome)
}
