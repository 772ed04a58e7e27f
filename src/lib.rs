pub mod adapters;
pub mod domain;
pub mod infra;
pub mod services;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::adapters::stripe::{checkout::CheckoutClient, signature::SignatureVerifier};

#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::PgPool,
    pub verifier: SignatureVerifier,
    pub checkout: Arc<CheckoutClient>,
}

/// Full application router. Built here so integration tests drive the same
/// routes the binary serves.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "ok" }))
        .route(
            "/checkout",
            post(adapters::stripe::checkout::checkout_handler),
        )
        .route("/webhook", post(adapters::stripe::webhook::webhook_handler))
        .route("/admin", get(adapters::admin::admin_handler))
        .with_state(state)
}
