use {
    super::signature::WebhookEvent,
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::{
            error::LedgerError,
            money::{Currency, Money, MoneyAmount},
            payment::{NewPayment, NewPaymentParams, PaymentStatus, SessionId, UpsertOutcome},
        },
        services::ingest::record_completed_checkout,
    },
    axum::{Json, extract::State, http::HeaderMap},
};

/// The only event kind that mutates state. Everything else is acknowledged
/// and dropped.
const COMPLETED_KIND: &str = "checkout.session.completed";

/// Pull the payment facts out of a verified `checkout.session.completed`
/// event. The session id is mandatory; amount, currency and email are
/// defaulted when the provider omits them rather than rejected.
fn session_facts(event: &WebhookEvent) -> Result<NewPayment, LedgerError> {
    let object = &event.data.object;

    let session_id = object
        .get("id")
        .and_then(|v| v.as_str())
        .map(SessionId::new)
        .transpose()?
        .ok_or_else(|| {
            LedgerError::Validation("completed session event carries no session id".into())
        })?;

    let amount = MoneyAmount::new(
        object
            .get("amount_total")
            .and_then(|v| v.as_i64())
            .unwrap_or(0),
    )?;

    let currency = object
        .get("currency")
        .and_then(|v| v.as_str())
        .map(Currency::new)
        .transpose()?
        .unwrap_or_else(Currency::usd);

    let customer_email = object
        .pointer("/customer_details/email")
        .and_then(|v| v.as_str())
        .unwrap_or("N/A")
        .to_string();

    Ok(NewPayment::new(NewPaymentParams {
        session_id,
        money: Money::new(amount, currency),
        status: PaymentStatus::Completed,
        customer_email,
    }))
}

#[tracing::instrument(
    name = "webhook",
    skip_all,
    fields(event_id = tracing::field::Empty, event_type = tracing::field::Empty)
)]
pub async fn webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<serde_json::Value>, ApiError> {
    let sig = headers.get("Stripe-Signature").and_then(|v| v.to_str().ok());
    let event = state.verifier.verify(body.as_bytes(), sig)?;

    // Add event context to the span so all subsequent logs are correlated.
    tracing::Span::current()
        .record("event_id", tracing::field::display(&event.id))
        .record("event_type", tracing::field::display(&event.event_type));

    if event.event_type != COMPLETED_KIND {
        tracing::info!("unhandled event kind, acknowledged without effect");
        return Ok(Json(serde_json::json!({"status": "ignored"})));
    }

    let payment = session_facts(&event)?;

    match record_completed_checkout(&state.pool, &payment).await? {
        UpsertOutcome::Created(id) => {
            tracing::info!(payment_id = %id, "payment created");
            Ok(Json(serde_json::json!({"status": "created"})))
        }
        UpsertOutcome::Updated(id) => {
            tracing::info!(payment_id = %id, "payment updated");
            Ok(Json(serde_json::json!({"status": "updated"})))
        }
    }
}
