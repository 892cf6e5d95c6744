//! Application State

use std::sync::Arc;

use installments_payments::IntentHandler;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Intent handler (None if Stripe is not configured)
    pub intents: Option<Arc<IntentHandler>>,
}
