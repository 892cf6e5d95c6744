//! Checkout Flow State Machine
//!
//! ```text
//!   NoIntent ──register_card──▶ AwaitingPlanConfirmation ──confirm_payment──┐
//!      │                                                                     │
//!      │ (auto-confirmed)                   ┌────────────────────────────────┤
//!      ▼                                    ▼                                ▼
//!   Settled ◀──intent retrieved── AwaitingNextAction                      Settled
//! ```
//!
//! State is rebuilt from the latest intent snapshot by [`reduce`]. Nothing
//! here talks to the network.

use std::collections::HashSet;

use crate::action::{ActionRequest, ActionType};
use crate::card::CardCompletion;
use crate::catalog::{Locale, PlanCatalog};
use crate::error::{FlowError, Result};
use crate::intent::{PaymentIntent, PaymentIntentStatus};
use crate::token::PlanSelection;

/// Where the checkout currently stands
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FlowState {
    #[default]
    NoIntent,
    AwaitingPlanConfirmation(PaymentIntent),
    AwaitingNextAction(PaymentIntent),
    Settled(PaymentIntent),
}

impl FlowState {
    pub fn intent(&self) -> Option<&PaymentIntent> {
        match self {
            FlowState::NoIntent => None,
            FlowState::AwaitingPlanConfirmation(intent)
            | FlowState::AwaitingNextAction(intent)
            | FlowState::Settled(intent) => Some(intent),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FlowState::NoIntent => "no_intent",
            FlowState::AwaitingPlanConfirmation(_) => "awaiting_plan_confirmation",
            FlowState::AwaitingNextAction(_) => "awaiting_next_action",
            FlowState::Settled(_) => "settled",
        }
    }
}

/// Inputs to the reducer
#[derive(Clone, Debug, PartialEq)]
pub enum FlowEvent {
    /// Response to `register_card`
    CardRegistered(Option<PaymentIntent>),
    /// Response to `confirm_payment`
    PaymentConfirmed(Option<PaymentIntent>),
    /// Fresh snapshot after a next action or a return-url redirect
    IntentRetrieved(PaymentIntent),
    /// Start a new payment
    Reset,
}

impl FlowEvent {
    pub fn for_action(action: ActionType, intent: Option<PaymentIntent>) -> Self {
        match action {
            ActionType::RegisterCard => FlowEvent::CardRegistered(intent),
            ActionType::ConfirmPayment => FlowEvent::PaymentConfirmed(intent),
        }
    }
}

/// Pure transition function
pub fn reduce(prior: &FlowState, event: FlowEvent) -> FlowState {
    match event {
        FlowEvent::Reset => FlowState::NoIntent,
        FlowEvent::CardRegistered(None) | FlowEvent::PaymentConfirmed(None) => prior.clone(),
        FlowEvent::CardRegistered(Some(intent)) => {
            if intent.pending_next_action().is_some() {
                FlowState::AwaitingNextAction(intent)
            } else if awaits_confirmation(&intent) {
                FlowState::AwaitingPlanConfirmation(intent)
            } else {
                FlowState::Settled(intent)
            }
        }
        FlowEvent::PaymentConfirmed(Some(intent)) => {
            if intent.pending_next_action().is_some() {
                FlowState::AwaitingNextAction(intent)
            } else {
                FlowState::Settled(intent)
            }
        }
        FlowEvent::IntentRetrieved(intent) => FlowState::Settled(intent),
    }
}

/// Error-slot text for an intent that settled without being paid
fn unsuccessful_outcome(intent: &PaymentIntent) -> Option<&'static str> {
    match intent.status {
        Some(PaymentIntentStatus::RequiresPaymentMethod) => {
            Some("Card verification failed. Start a new payment to try another card.")
        }
        Some(PaymentIntentStatus::Canceled) => Some("The payment was canceled."),
        _ => None,
    }
}

fn awaits_confirmation(intent: &PaymentIntent) -> bool {
    matches!(
        intent.status,
        None | Some(PaymentIntentStatus::RequiresConfirmation)
    )
}

/// Next-action trigger guard, keyed by intent id
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NextActionLatch {
    fired: HashSet<String>,
}

impl NextActionLatch {
    /// Returns the client secret to hand to the gateway, at most once per intent
    pub fn try_fire(&mut self, intent: &PaymentIntent) -> Option<String> {
        let secret = intent.pending_next_action()?;
        if !self.fired.insert(intent.id.clone()) {
            return None;
        }
        Some(secret.to_string())
    }

    pub fn has_fired(&self, intent_id: &str) -> bool {
        self.fired.contains(intent_id)
    }
}

/// Client-side checkout state: flow state, latch, selection and error slot
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CheckoutFlow {
    state: FlowState,
    latch: NextActionLatch,
    card: CardCompletion,
    selection: PlanSelection,
    error: Option<String>,
    pending: bool,
    locale: Locale,
}

impl CheckoutFlow {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            ..Default::default()
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selection(&self) -> &PlanSelection {
        &self.selection
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Plan catalog for the current intent
    pub fn catalog(&self) -> PlanCatalog {
        PlanCatalog::from_intent(self.state.intent(), self.locale)
    }

    /// Card input change event; `true` when the caller should submit
    pub fn card_changed(&mut self, complete: bool, has_error: bool) -> bool {
        self.card.on_change(complete, has_error) && matches!(self.state, FlowState::NoIntent)
    }

    /// Whether the register-card submit control is enabled
    pub fn can_register(&self, customer_id: Option<&str>) -> bool {
        matches!(self.state, FlowState::NoIntent)
            && !self.pending
            && self.card.is_complete()
            && customer_id.is_some_and(|id| !id.is_empty())
    }

    /// Record the plan selector's value
    pub fn select_plan(&mut self, token: &str) {
        match PlanSelection::from_token(token) {
            Ok(selection) => self.selection = selection,
            Err(e) => self.fail(&e),
        }
    }

    /// The `confirm_payment` request for the current intent and selection
    pub fn confirm_request(&self) -> Result<ActionRequest> {
        match &self.state {
            FlowState::AwaitingPlanConfirmation(intent) => Ok(ActionRequest::ConfirmPayment {
                payment_intent_id: intent.id.clone(),
                plan: self.selection.clone(),
            }),
            _ => Err(FlowError::InvalidState("no intent awaiting confirmation")),
        }
    }

    /// Client secret for the next action, once per intent
    pub fn take_next_action(&mut self) -> Option<String> {
        match &self.state {
            FlowState::AwaitingNextAction(intent) => self.latch.try_fire(intent),
            _ => None,
        }
    }

    /// Mark a request as in flight
    pub fn begin(&mut self) {
        self.pending = true;
    }

    /// Apply the outcome of an orchestrated step.
    ///
    /// Success runs the reducer and clears the error slot. Failure leaves the
    /// state where it was; silent failures do not touch the error slot.
    pub fn apply(&mut self, outcome: Result<FlowEvent>) {
        self.pending = false;
        match outcome {
            Ok(event) => {
                let next = reduce(&self.state, event);
                if next != self.state {
                    tracing::debug!(from = self.state.name(), to = next.name(), "Checkout transition");
                }
                if matches!(next, FlowState::NoIntent) && next != self.state {
                    // Fresh card element after a reset
                    self.selection = PlanSelection::OneTime;
                    self.card = CardCompletion::new();
                }
                self.state = next;
                self.error = None;
                if let FlowState::Settled(intent) = &self.state {
                    self.error = unsuccessful_outcome(intent).map(str::to_string);
                }
            }
            Err(e) => self.fail(&e),
        }
    }

    fn fail(&mut self, error: &FlowError) {
        if error.is_silent() {
            tracing::debug!(%error, "Checkout step skipped");
            return;
        }
        tracing::warn!(%error, "Checkout step failed");
        self.error = Some(error.user_message());
    }
}
