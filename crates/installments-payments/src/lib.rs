//! # installments-payments
//!
//! Server-side Payment Intent handling for the card installments checkout.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────┐ register_card  ┌───────────────┐  create (installments  ┌────────┐
//! │ Browser  │───────────────▶│ IntentHandler │──── enabled) ─────────▶│ Stripe │
//! │          │                │               │◀── available_plans ────│        │
//! │          │                │               │── confirm if none ────▶│        │
//! │          │ confirm_payment│               │── confirm + plan ─────▶│        │
//! └──────────┘───────────────▶└───────────────┘◀── next_action? ───────└────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use installments_payments::{CheckoutConfig, IntentHandler, StripeGateway};
//!
//! let gateway = Arc::new(StripeGateway::from_env()?);
//! let handler = IntentHandler::new(gateway, CheckoutConfig::from_env()?);
//!
//! let intent = handler.register_card("pm_xxx", "cus_xxx").await?;
//! if intent.available_plans().is_empty() {
//!     // already confirmed
//! }
//! ```

mod config;
mod error;
mod gateway;
mod handler;
pub mod mock;
mod stripe_gateway;

pub use config::{CheckoutConfig, StripeConfig};
pub use error::{PaymentError, Result};
pub use gateway::{validate_intent_id, ConfirmIntent, CreateIntent, PaymentGateway};
pub use handler::{ActionForm, IntentAction, IntentHandler};
pub use mock::MockGateway;
pub use stripe_gateway::StripeGateway;
