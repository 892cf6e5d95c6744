//! Card Installments Checkout Server
//!
//! Axum-based server for the installments checkout demo: the form action
//! endpoint that creates and confirms Payment Intents, customer bootstrap,
//! intent retrieval, and the WASM frontend.

mod app;
mod config;
mod handlers;
mod state;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use installments_payments::{CheckoutConfig, IntentHandler, PaymentGateway, StripeGateway};

use crate::app::router;
use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server = ServerConfig::from_env();
    let checkout = CheckoutConfig::from_env()?;

    // Initialize payments
    let intents = match StripeGateway::from_env() {
        Ok(gateway) => {
            tracing::info!("✓ Stripe configured");
            if checkout.publishable_key.is_none() {
                tracing::warn!("⚠ STRIPE_PUBLISHABLE_KEY not set - card input will not load");
            }
            let gateway: Arc<dyn PaymentGateway> = Arc::new(gateway);
            let handler = IntentHandler::new(gateway, checkout.clone());
            tracing::info!("  Gateway: {}", handler.gateway_name());
            Some(Arc::new(handler))
        }
        Err(e) => {
            tracing::warn!("⚠ Stripe not configured - payments disabled ({})", e);
            tracing::warn!("  Set STRIPE_SECRET_KEY and STRIPE_PUBLISHABLE_KEY in .env");
            None
        }
    };

    let state = AppState { intents };
    let app = router(state, &server);

    // Start server
    let listener = tokio::net::TcpListener::bind(&server.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 installments checkout running on http://{}", server.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("  Amount: {} {}", checkout.amount, checkout.currency.to_uppercase());
    tracing::info!("  Return URL: {}", checkout.return_url);
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                   - Health check");
    tracing::info!("  POST /api/customers            - Create demo customer");
    tracing::info!("  POST /api/action               - register_card / confirm_payment");
    tracing::info!("  GET  /api/payment_intents/{{id}} - Retrieve payment intent");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
