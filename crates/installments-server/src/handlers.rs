//! HTTP Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Form, Json,
};
use serde::Serialize;

use installments_core::ActionResponse;
use installments_payments::{ActionForm, IntentAction, IntentHandler, PaymentError};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub stripe_configured: bool,
    pub gateway: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub customer_id: String,
    pub publishable_key: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, error: impl Into<String>, code: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn intents(state: &AppState) -> Result<&Arc<IntentHandler>, ApiError> {
    state.intents.as_ref().ok_or_else(|| {
        error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Payments not configured",
            "PAYMENTS_DISABLED",
        )
    })
}

fn payment_error(err: &PaymentError) -> ApiError {
    if err.is_client_error() {
        tracing::warn!("Rejected request: {}", err);
        return error_response(StatusCode::BAD_REQUEST, err.user_message(), "INVALID_REQUEST");
    }

    tracing::error!("Gateway error: {}", err);
    match err {
        PaymentError::Timeout => {
            error_response(StatusCode::GATEWAY_TIMEOUT, err.user_message(), "GATEWAY_TIMEOUT")
        }
        _ => error_response(StatusCode::BAD_GATEWAY, err.user_message(), "GATEWAY_ERROR"),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        stripe_configured: state.intents.is_some(),
        gateway: state.intents.as_ref().map(|h| h.gateway_name().to_string()),
    })
}

/// Checkout action endpoint (`register_card` / `confirm_payment`)
pub async fn handle_action(
    State(state): State<AppState>,
    Form(form): Form<ActionForm>,
) -> Result<Json<ActionResponse>, ApiError> {
    let handler = intents(&state)?;
    let action = IntentAction::try_from(form).map_err(|e| payment_error(&e))?;

    let intent = handler.handle(action).await.map_err(|e| payment_error(&e))?;

    Ok(Json(ActionResponse {
        payment_intent: Some(intent),
    }))
}

/// Create the demo customer for a new checkout session
pub async fn create_customer(
    State(state): State<AppState>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let handler = intents(&state)?;
    let customer_id = handler.create_customer().await.map_err(|e| payment_error(&e))?;

    Ok(Json(CustomerResponse {
        customer_id,
        publishable_key: handler.config().publishable_key.clone(),
    }))
}

/// Current snapshot of a payment intent
pub async fn get_payment_intent(
    State(state): State<AppState>,
    Path(payment_intent_id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    let handler = intents(&state)?;
    let intent = handler
        .retrieve_intent(&payment_intent_id)
        .await
        .map_err(|e| payment_error(&e))?;

    Ok(Json(ActionResponse {
        payment_intent: Some(intent),
    }))
}
