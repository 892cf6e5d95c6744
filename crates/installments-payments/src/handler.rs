//! Intent Handler
//!
//! Server side of the checkout. Stateless: every call is one gateway round
//! trip (two for an auto-confirmed registration), and nothing is stored here.

use std::sync::Arc;

use installments_core::{ActionType, InstallmentPlan, PaymentIntent};
use serde::Deserialize;

use crate::config::CheckoutConfig;
use crate::error::{PaymentError, Result};
use crate::gateway::{validate_intent_id, ConfirmIntent, CreateIntent, PaymentGateway};

/// Raw form body of an action request
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ActionForm {
    #[serde(default)]
    pub action_type: Option<String>,
    #[serde(default)]
    pub payment_method_id: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub payment_intent_id: Option<String>,
    #[serde(default)]
    pub installments_plan_count: Option<String>,
    #[serde(default)]
    pub installments_plan_interval: Option<String>,
    #[serde(default)]
    pub installments_plan_type: Option<String>,
}

/// A validated action
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntentAction {
    RegisterCard {
        payment_method_id: String,
        customer_id: String,
    },
    ConfirmPayment {
        payment_intent_id: String,
        plan: Option<InstallmentPlan>,
    },
}

impl TryFrom<ActionForm> for IntentAction {
    type Error = PaymentError;

    fn try_from(form: ActionForm) -> Result<Self> {
        let action_type = present(form.action_type).ok_or(PaymentError::MissingField("action_type"))?;

        match ActionType::parse(&action_type) {
            Some(ActionType::RegisterCard) => Ok(IntentAction::RegisterCard {
                payment_method_id: required(form.payment_method_id, "payment_method_id")?,
                customer_id: required(form.customer_id, "customer_id")?,
            }),
            Some(ActionType::ConfirmPayment) => {
                let payment_intent_id = required(form.payment_intent_id, "payment_intent_id")?;
                validate_intent_id(&payment_intent_id)?;
                let plan = match present(form.installments_plan_type) {
                    Some(plan_type) => Some(InstallmentPlan {
                        count: parse_count(form.installments_plan_count)?,
                        interval: present(form.installments_plan_interval),
                        plan_type,
                    }),
                    None => None,
                };

                Ok(IntentAction::ConfirmPayment {
                    payment_intent_id,
                    plan,
                })
            }
            None => Err(PaymentError::UnknownAction(action_type)),
        }
    }
}

/// Blank form values count as absent
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, field: &'static str) -> Result<String> {
    present(value).ok_or(PaymentError::MissingField(field))
}

fn parse_count(value: Option<String>) -> Result<Option<u64>> {
    present(value)
        .map(|raw| {
            raw.parse::<u64>().map_err(|_| PaymentError::InvalidField {
                field: "installments_plan_count",
                value: raw,
            })
        })
        .transpose()
}

/// Creates and confirms Payment Intents on behalf of the checkout page
pub struct IntentHandler {
    gateway: Arc<dyn PaymentGateway>,
    config: CheckoutConfig,
}

impl IntentHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>, config: CheckoutConfig) -> Self {
        Self { gateway, config }
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    pub fn gateway_name(&self) -> &str {
        self.gateway.name()
    }

    /// Dispatch a validated action
    pub async fn handle(&self, action: IntentAction) -> Result<PaymentIntent> {
        match action {
            IntentAction::RegisterCard {
                payment_method_id,
                customer_id,
            } => self.register_card(&payment_method_id, &customer_id).await,
            IntentAction::ConfirmPayment {
                payment_intent_id,
                plan,
            } => self.confirm_payment(&payment_intent_id, plan).await,
        }
    }

    /// Create an intent with installments requested.
    ///
    /// When the card offers no plans there is nothing to choose, so the
    /// intent is confirmed right away.
    pub async fn register_card(&self, payment_method_id: &str, customer_id: &str) -> Result<PaymentIntent> {
        let params = CreateIntent {
            amount: self.config.amount,
            currency: self.config.currency.clone(),
            customer: customer_id.to_string(),
            payment_method: payment_method_id.to_string(),
            installments_enabled: true,
        };

        let intent = self.gateway.create_intent(&params).await?;
        let plans = intent.available_plans().len();
        tracing::info!(
            intent_id = %intent.id,
            customer_id = %customer_id,
            plans,
            "Created payment intent"
        );

        if plans > 0 {
            return Ok(intent);
        }

        tracing::info!(intent_id = %intent.id, "No installment plans available, confirming");
        self.confirm_payment(&intent.id, None).await
    }

    /// Confirm an intent, attaching the installments plan if one was chosen
    pub async fn confirm_payment(&self, payment_intent_id: &str, plan: Option<InstallmentPlan>) -> Result<PaymentIntent> {
        validate_intent_id(payment_intent_id)?;
        let params = ConfirmIntent {
            return_url: self.config.return_url.clone(),
            plan,
        };

        let intent = self.gateway.confirm_intent(payment_intent_id, &params).await?;
        tracing::info!(
            intent_id = %intent.id,
            status = ?intent.status,
            plan = ?params.plan,
            next_action = intent.pending_next_action().is_some(),
            "Confirmed payment intent"
        );

        Ok(intent)
    }

    /// Fetch an intent (after a next action or return-url redirect)
    pub async fn retrieve_intent(&self, payment_intent_id: &str) -> Result<PaymentIntent> {
        if payment_intent_id.trim().is_empty() {
            return Err(PaymentError::MissingField("payment_intent_id"));
        }
        validate_intent_id(payment_intent_id)?;
        self.gateway.retrieve_intent(payment_intent_id).await
    }

    /// Create the demo customer for a new checkout session
    pub async fn create_customer(&self) -> Result<String> {
        self.gateway.create_customer(&self.config.customer_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{GatewayCall, MockGateway};
    use installments_core::PaymentIntentStatus;

    fn handler(gateway: &Arc<MockGateway>) -> IntentHandler {
        IntentHandler::new(gateway.clone(), CheckoutConfig::default())
    }

    fn form(pairs: &[(&str, &str)]) -> ActionForm {
        let mut form = ActionForm::default();
        for (key, value) in pairs {
            let value = Some((*value).to_string());
            match *key {
                "action_type" => form.action_type = value,
                "payment_method_id" => form.payment_method_id = value,
                "customer_id" => form.customer_id = value,
                "payment_intent_id" => form.payment_intent_id = value,
                "installments_plan_count" => form.installments_plan_count = value,
                "installments_plan_interval" => form.installments_plan_interval = value,
                "installments_plan_type" => form.installments_plan_type = value,
                other => panic!("unexpected field {other}"),
            }
        }
        form
    }

    #[test]
    fn test_parse_register_card() {
        let action = IntentAction::try_from(form(&[
            ("action_type", "register_card"),
            ("payment_method_id", "pm_1"),
            ("customer_id", "cus_1"),
        ]))
        .unwrap();

        assert_eq!(
            action,
            IntentAction::RegisterCard {
                payment_method_id: "pm_1".into(),
                customer_id: "cus_1".into(),
            }
        );
    }

    #[test]
    fn test_missing_identifiers_rejected() {
        let err = IntentAction::try_from(form(&[
            ("action_type", "register_card"),
            ("payment_method_id", "pm_1"),
            ("customer_id", "  "),
        ]))
        .unwrap_err();
        assert!(matches!(err, PaymentError::MissingField("customer_id")));

        let err = IntentAction::try_from(form(&[("action_type", "confirm_payment")])).unwrap_err();
        assert!(matches!(err, PaymentError::MissingField("payment_intent_id")));

        let err = IntentAction::try_from(form(&[])).unwrap_err();
        assert!(matches!(err, PaymentError::MissingField("action_type")));
    }

    #[test]
    fn test_unknown_action_rejected() {
        let err = IntentAction::try_from(form(&[("action_type", "refund")])).unwrap_err();
        assert!(matches!(err, PaymentError::UnknownAction(a) if a == "refund"));
    }

    #[test]
    fn test_parse_confirm_with_bonus_plan() {
        let action = IntentAction::try_from(form(&[
            ("action_type", "confirm_payment"),
            ("payment_intent_id", "pi_1"),
            ("installments_plan_count", ""),
            ("installments_plan_interval", ""),
            ("installments_plan_type", "bonus"),
        ]))
        .unwrap();

        assert_eq!(
            action,
            IntentAction::ConfirmPayment {
                payment_intent_id: "pi_1".into(),
                plan: Some(InstallmentPlan::of_type("bonus")),
            }
        );
    }

    #[test]
    fn test_parse_confirm_one_time() {
        let action = IntentAction::try_from(form(&[
            ("action_type", "confirm_payment"),
            ("payment_intent_id", "pi_1"),
        ]))
        .unwrap();

        assert_eq!(
            action,
            IntentAction::ConfirmPayment {
                payment_intent_id: "pi_1".into(),
                plan: None,
            }
        );
    }

    #[test]
    fn test_parse_confirm_bad_count() {
        let err = IntentAction::try_from(form(&[
            ("action_type", "confirm_payment"),
            ("payment_intent_id", "pi_1"),
            ("installments_plan_count", "three"),
            ("installments_plan_type", "fixed_count"),
        ]))
        .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidField { field: "installments_plan_count", .. }));
    }

    #[tokio::test]
    async fn test_register_without_plans_auto_confirms() {
        let gateway = Arc::new(MockGateway::new());
        let intent = handler(&gateway).register_card("pm_1", "cus_1").await.unwrap();

        assert_eq!(intent.status, Some(PaymentIntentStatus::Succeeded));

        let calls = gateway.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[0], GatewayCall::CreateIntent(p) if p.installments_enabled && p.amount == 100_000));
        assert!(matches!(
            &calls[1],
            GatewayCall::ConfirmIntent { payment_intent_id, params }
                if *payment_intent_id == intent.id && params.plan.is_none()
        ));
    }

    #[tokio::test]
    async fn test_register_with_plans_waits_for_choice() {
        let gateway = Arc::new(MockGateway::new().with_plans(vec![
            InstallmentPlan::fixed(3, "month"),
            InstallmentPlan::of_type("bonus"),
        ]));
        let intent = handler(&gateway).register_card("pm_1", "cus_1").await.unwrap();

        assert_eq!(intent.status, Some(PaymentIntentStatus::RequiresConfirmation));
        assert_eq!(intent.available_plans().len(), 2);
        assert_eq!(gateway.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_confirm_attaches_plan_and_return_url() {
        let gateway = Arc::new(MockGateway::new().with_plans(vec![InstallmentPlan::fixed(3, "month")]));
        let handler = handler(&gateway);
        let created = handler.register_card("pm_1", "cus_1").await.unwrap();

        let confirmed = handler
            .handle(IntentAction::ConfirmPayment {
                payment_intent_id: created.id.clone(),
                plan: Some(InstallmentPlan::fixed(3, "month")),
            })
            .await
            .unwrap();

        assert_eq!(
            confirmed.installments().and_then(|i| i.plan.clone()),
            Some(InstallmentPlan::fixed(3, "month"))
        );
        let calls = gateway.calls();
        let GatewayCall::ConfirmIntent { params, .. } = &calls[1] else {
            panic!("expected confirm call");
        };
        assert_eq!(params.return_url, "http://localhost:3000/");
    }

    #[tokio::test]
    async fn test_gateway_failure_propagates() {
        let gateway = Arc::new(MockGateway::new().declining("Your card was declined."));
        let err = handler(&gateway).register_card("pm_1", "cus_1").await.unwrap_err();

        assert!(matches!(err, PaymentError::Stripe(ref m) if m == "Your card was declined."));
        assert_eq!(gateway.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_retrieve_requires_id() {
        let gateway = Arc::new(MockGateway::new());
        let err = handler(&gateway).retrieve_intent("").await.unwrap_err();
        assert!(matches!(err, PaymentError::MissingField("payment_intent_id")));
        assert!(gateway.calls().is_empty());
    }

    #[test]
    fn test_confirm_rejects_foreign_resource_id() {
        let err = IntentAction::try_from(form(&[
            ("action_type", "confirm_payment"),
            ("payment_intent_id", "../customers/cus_123"),
        ]))
        .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidField { field: "payment_intent_id", .. }));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_traversal_id_never_reaches_gateway() {
        let gateway = Arc::new(MockGateway::new());
        let handler = handler(&gateway);

        let err = handler.retrieve_intent("../customers/cus_123").await.unwrap_err();
        assert!(matches!(err, PaymentError::InvalidField { field: "payment_intent_id", .. }));

        let err = handler
            .confirm_payment("pi_1/../../customers/cus_123", None)
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidField { .. }));

        assert!(gateway.calls().is_empty());
    }
}
