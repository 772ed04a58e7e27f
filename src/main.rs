use {
    axum::extract::DefaultBodyLimit,
    pay_ledger::{
        AppState,
        adapters::stripe::{
            checkout::{CheckoutClient, CheckoutConfig},
            signature::SignatureVerifier,
        },
    },
    sqlx::postgres::PgPoolOptions,
    std::{env, sync::Arc, time::Duration},
    tokio::signal,
    tower_http::timeout::TimeoutLayer,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let stripe_secret_key =
        env::var("STRIPE_SECRET_KEY").expect("STRIPE_SECRET_KEY must be set");
    let stripe_webhook_secret =
        env::var("STRIPE_WEBHOOK_SECRET").expect("STRIPE_WEBHOOK_SECRET must be set");
    let app_url = env::var("APP_URL").expect("APP_URL must be set");
    let price_id = env::var("STRIPE_PRICE_ID").ok().filter(|v| !v.is_empty());
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&database_url)
        .await
        .expect("failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    let state = AppState {
        pool,
        verifier: SignatureVerifier::new(stripe_webhook_secret),
        checkout: Arc::new(CheckoutClient::new(CheckoutConfig {
            secret_key: stripe_secret_key,
            price_id,
            app_url,
        })),
    };

    let app = pay_ledger::router(state)
        .layer(DefaultBodyLimit::max(64 * 1024)) // 64 KB — provider events are typically <20 KB
        .layer(TimeoutLayer::new(Duration::from_secs(30)));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind");
    tracing::info!("listening on {bind_addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl+c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
