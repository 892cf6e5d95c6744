//! Mock Payment Gateway
//!
//! For testing and offline demos. Keeps intents in memory and records every
//! call so tests can assert on exact call sequences.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use installments_core::intent::{CardOptions, Installments, PaymentMethodOptions};
use installments_core::{InstallmentPlan, PaymentIntent, PaymentIntentStatus};

use crate::error::{PaymentError, Result};
use crate::gateway::{ConfirmIntent, CreateIntent, PaymentGateway};

/// A recorded gateway call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayCall {
    CreateCustomer(String),
    CreateIntent(CreateIntent),
    ConfirmIntent {
        payment_intent_id: String,
        params: ConfirmIntent,
    },
    RetrieveIntent(String),
}

/// In-memory gateway
#[derive(Default)]
pub struct MockGateway {
    /// Plans offered on every created intent
    plans: Vec<InstallmentPlan>,
    /// Whether confirmation demands a 3-D Secure style next action
    requires_action: bool,
    /// Decline every create/confirm with this message
    decline: Option<String>,
    intents: Mutex<HashMap<String, PaymentIntent>>,
    calls: Mutex<Vec<GatewayCall>>,
    sequence: AtomicU64,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer these plans on created intents
    pub fn with_plans(mut self, plans: Vec<InstallmentPlan>) -> Self {
        self.plans = plans;
        self
    }

    /// Make confirmation return a next action
    pub fn with_next_action(mut self) -> Self {
        self.requires_action = true;
        self
    }

    /// Decline create and confirm calls
    pub fn declining(mut self, message: impl Into<String>) -> Self {
        self.decline = Some(message.into());
        self
    }

    /// Calls made so far, in order
    pub fn calls(&self) -> Vec<GatewayCall> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: GatewayCall) {
        lock(&self.calls).push(call);
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}_mock{n:04}")
    }

    fn check_decline(&self) -> Result<()> {
        match &self.decline {
            Some(message) => Err(PaymentError::Stripe(message.clone())),
            None => Ok(()),
        }
    }

    fn stored(&self, payment_intent_id: &str) -> Result<PaymentIntent> {
        lock(&self.intents)
            .get(payment_intent_id)
            .cloned()
            .ok_or_else(|| PaymentError::Stripe(format!("No such payment_intent: '{payment_intent_id}'")))
    }

    fn store(&self, intent: &PaymentIntent) {
        lock(&self.intents).insert(intent.id.clone(), intent.clone());
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_customer(&self, name: &str) -> Result<String> {
        self.record(GatewayCall::CreateCustomer(name.to_string()));
        Ok(self.next_id("cus"))
    }

    async fn create_intent(&self, params: &CreateIntent) -> Result<PaymentIntent> {
        self.record(GatewayCall::CreateIntent(params.clone()));
        self.check_decline()?;

        let id = self.next_id("pi");
        let installments = params.installments_enabled.then(|| Installments {
            enabled: true,
            available_plans: Some(self.plans.clone()),
            plan: None,
        });

        let intent = PaymentIntent {
            client_secret: Some(format!("{id}_secret_mock")),
            status: Some(PaymentIntentStatus::RequiresConfirmation),
            amount: Some(params.amount),
            currency: Some(params.currency.clone()),
            next_action: None,
            payment_method_options: Some(PaymentMethodOptions {
                card: Some(CardOptions { installments }),
            }),
            id,
        };

        self.store(&intent);
        Ok(intent)
    }

    async fn confirm_intent(&self, payment_intent_id: &str, params: &ConfirmIntent) -> Result<PaymentIntent> {
        self.record(GatewayCall::ConfirmIntent {
            payment_intent_id: payment_intent_id.to_string(),
            params: params.clone(),
        });
        self.check_decline()?;

        let mut intent = self.stored(payment_intent_id)?;
        if intent.status != Some(PaymentIntentStatus::RequiresConfirmation) {
            return Err(PaymentError::Stripe(format!(
                "This PaymentIntent's status is {}",
                intent.status.map_or("unknown", |s| s.as_str())
            )));
        }

        if let Some(installments) = intent
            .payment_method_options
            .as_mut()
            .and_then(|o| o.card.as_mut())
            .and_then(|c| c.installments.as_mut())
        {
            installments.plan = params.plan.clone();
        }

        if self.requires_action {
            intent.status = Some(PaymentIntentStatus::RequiresAction);
            intent.next_action = Some(serde_json::json!({
                "type": "redirect_to_url",
                "redirect_to_url": { "return_url": params.return_url },
            }));
        } else {
            intent.status = Some(PaymentIntentStatus::Succeeded);
        }

        self.store(&intent);

        // Verification completes out of band: later retrievals see it settled
        if self.requires_action {
            let mut settled = intent.clone();
            settled.status = Some(PaymentIntentStatus::Succeeded);
            settled.next_action = None;
            self.store(&settled);
        }

        Ok(intent)
    }

    async fn retrieve_intent(&self, payment_intent_id: &str) -> Result<PaymentIntent> {
        self.record(GatewayCall::RetrieveIntent(payment_intent_id.to_string()));
        self.stored(payment_intent_id)
    }

    fn name(&self) -> &str {
        "MockGateway"
    }
}
