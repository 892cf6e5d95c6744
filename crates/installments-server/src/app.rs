//! Router

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::handlers::{create_customer, get_payment_intent, handle_action, health_check};
use crate::state::AppState;

/// Build the application router
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(health_check))

        // Checkout
        .route("/api/action", post(handle_action))
        .route("/api/customers", post(create_customer))
        .route("/api/payment_intents/{id}", get(get_payment_intent))

        // Static files (WASM frontend)
        .fallback_service(ServeDir::new(&config.static_dir))

        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
