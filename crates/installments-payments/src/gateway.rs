//! Payment Gateway Abstraction
//!
//! The calls the intent handler makes against the gateway. `StripeGateway`
//! talks to the real API; `MockGateway` keeps intents in memory for tests.

use async_trait::async_trait;
use installments_core::{InstallmentPlan, PaymentIntent};

use crate::error::{PaymentError, Result};

/// Payment gateway trait (Strategy pattern)
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a customer, returning its id
    async fn create_customer(&self, name: &str) -> Result<String>;

    /// Create a Payment Intent
    async fn create_intent(&self, params: &CreateIntent) -> Result<PaymentIntent>;

    /// Confirm an existing Payment Intent
    async fn confirm_intent(&self, payment_intent_id: &str, params: &ConfirmIntent) -> Result<PaymentIntent>;

    /// Fetch the current snapshot of a Payment Intent
    async fn retrieve_intent(&self, payment_intent_id: &str) -> Result<PaymentIntent>;

    /// Gateway name
    fn name(&self) -> &str;
}

/// Check that a caller-supplied id names a Payment Intent (`pi_` plus
/// alphanumerics). Ids end up in gateway URL paths.
pub fn validate_intent_id(payment_intent_id: &str) -> Result<&str> {
    let valid = payment_intent_id
        .strip_prefix("pi_")
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric()));

    if valid {
        Ok(payment_intent_id)
    } else {
        Err(PaymentError::InvalidField {
            field: "payment_intent_id",
            value: payment_intent_id.to_string(),
        })
    }
}

/// Parameters for creating an intent
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateIntent {
    pub amount: i64,
    pub currency: String,
    pub customer: String,
    pub payment_method: String,
    /// Request the installments capability on the card
    pub installments_enabled: bool,
}

impl CreateIntent {
    /// Stripe form encoding
    pub fn form(&self) -> Vec<(String, String)> {
        let mut form = vec![
            ("amount".to_string(), self.amount.to_string()),
            ("currency".to_string(), self.currency.clone()),
            ("customer".to_string(), self.customer.clone()),
            ("payment_method".to_string(), self.payment_method.clone()),
        ];
        if self.installments_enabled {
            form.push((
                "payment_method_options[card][installments][enabled]".to_string(),
                "true".to_string(),
            ));
        }
        form
    }
}

/// Parameters for confirming an intent
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmIntent {
    pub return_url: String,
    /// Installments plan to pay with; `None` pays in full
    pub plan: Option<InstallmentPlan>,
}

impl ConfirmIntent {
    /// Stripe form encoding. Plan count and interval are only sent when set.
    pub fn form(&self) -> Vec<(String, String)> {
        const PLAN: &str = "payment_method_options[card][installments][plan]";

        let mut form = vec![("return_url".to_string(), self.return_url.clone())];
        if let Some(plan) = &self.plan {
            form.push((format!("{PLAN}[type]"), plan.plan_type.clone()));
            if let Some(count) = plan.count {
                form.push((format!("{PLAN}[count]"), count.to_string()));
            }
            if let Some(interval) = &plan.interval {
                form.push((format!("{PLAN}[interval]"), interval.clone()));
            }
        }
        form
    }
}
