use {
    crate::{AppState, adapters::api_errors::ApiError, domain::error::LedgerError},
    axum::{extract::State, response::Redirect},
    stripe::{
        CheckoutSession, CheckoutSessionMode, Client, CreateCheckoutSession,
        CreateCheckoutSessionLineItems, CreateCheckoutSessionLineItemsPriceData,
        CreateCheckoutSessionLineItemsPriceDataProductData,
        CreateCheckoutSessionPaymentMethodTypes, Currency,
    },
};

/// Inline fallback when no price id is configured: 19.99 USD, single unit.
const FALLBACK_UNIT_AMOUNT: i64 = 1999;
const FALLBACK_PRODUCT_NAME: &str = "Digital product pack";

/// Checkout configuration, resolved once at startup and handed to the
/// client at construction, never read from ambient process state.
pub struct CheckoutConfig {
    pub secret_key: String,
    /// Catalog price to sell; `None` falls back to the inline price.
    pub price_id: Option<String>,
    /// Public base URL the provider redirects back to.
    pub app_url: String,
}

/// Boundary to the provider's hosted-checkout API.
pub struct CheckoutClient {
    client: Client,
    price_id: Option<String>,
    success_url: String,
    cancel_url: String,
}

impl CheckoutClient {
    pub fn new(config: CheckoutConfig) -> Self {
        let base = config.app_url.trim_end_matches('/');
        Self {
            client: Client::new(config.secret_key),
            price_id: config.price_id,
            // {CHECKOUT_SESSION_ID} is substituted by the provider.
            success_url: format!("{base}/success?session_id={{CHECKOUT_SESSION_ID}}"),
            cancel_url: format!("{base}/"),
        }
    }

    /// Create a hosted session and return its redirect URL.
    pub async fn create_session(&self) -> Result<String, LedgerError> {
        let line_item = match &self.price_id {
            Some(price) => CreateCheckoutSessionLineItems {
                price: Some(price.clone()),
                quantity: Some(1),
                ..Default::default()
            },
            None => CreateCheckoutSessionLineItems {
                price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                    currency: Currency::USD,
                    product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                        name: FALLBACK_PRODUCT_NAME.to_string(),
                        ..Default::default()
                    }),
                    unit_amount: Some(FALLBACK_UNIT_AMOUNT),
                    ..Default::default()
                }),
                quantity: Some(1),
                ..Default::default()
            },
        };

        let mut params = CreateCheckoutSession::new();
        params.mode = Some(CheckoutSessionMode::Payment);
        params.payment_method_types = Some(vec![CreateCheckoutSessionPaymentMethodTypes::Card]);
        params.line_items = Some(vec![line_item]);
        params.success_url = Some(&self.success_url);
        params.cancel_url = Some(&self.cancel_url);

        let session = CheckoutSession::create(&self.client, params)
            .await
            .map_err(|e| LedgerError::Provider(format!("checkout session create: {e}")))?;

        session
            .url
            .ok_or_else(|| LedgerError::Provider("created session has no redirect url".into()))
    }
}

/// POST /checkout: start a hosted payment and send the client there.
pub async fn checkout_handler(State(state): State<AppState>) -> Result<Redirect, ApiError> {
    let url = state.checkout.create_session().await?;
    tracing::info!("checkout session created, redirecting");
    // Redirect::to answers 303 See Other, which downgrades the POST to a GET
    // on the provider-hosted page.
    Ok(Redirect::to(&url))
}
