//! # installments-core
//!
//! Installment plan selection and the payment confirmation flow, with no UI
//! or network attached.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        CheckoutFlow                          │
//! │  ┌─────────────┐  ┌──────────────┐  ┌─────────────────────┐  │
//! │  │ PlanCatalog │  │   reduce()   │  │  NextActionLatch    │  │
//! │  │  + tokens   │──│  FlowState   │──│  (keyed by intent)  │  │
//! │  └─────────────┘  └──────────────┘  └─────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//!                 ▲ FlowEvent
//!       ┌─────────┴──────────┐
//!       │    orchestrator    │── CardTokenizer / NextActionHandler (Stripe.js)
//!       │  (async, traits)   │── ActionTransport (intent handler)
//!       └────────────────────┘
//! ```

pub mod action;
pub mod card;
pub mod catalog;
pub mod error;
pub mod flow;
pub mod intent;
pub mod orchestrator;
pub mod readiness;
pub mod token;

pub use action::{ActionRequest, ActionResponse, ActionType};
pub use card::CardCompletion;
pub use catalog::{InstallmentPlanOption, Locale, PlanCatalog, PlanKind};
pub use error::{FlowError, Result};
pub use flow::{reduce, CheckoutFlow, FlowEvent, FlowState, NextActionLatch};
pub use intent::{InstallmentPlan, PaymentIntent, PaymentIntentStatus};
pub use readiness::{card_readiness, client_readiness, NotReady, Readiness};
pub use token::{PlanSelection, ONE_TIME_TOKEN};
