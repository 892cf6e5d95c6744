//! Payment Orchestration
//!
//! Async steps of the checkout, written against the client-side gateway
//! (Stripe.js) and the intent handler transport as traits. Each step returns
//! the [`FlowEvent`] to feed into [`crate::flow::CheckoutFlow::apply`]; none
//! of them mutate flow state, so a view can hold the state however it likes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use installments_core::orchestrator;
//!
//! flow.begin();
//! let outcome = orchestrator::register_card(readiness, &api, Some(&customer_id)).await;
//! flow.apply(outcome);
//!
//! if let Some(secret) = flow.take_next_action() {
//!     let outcome = orchestrator::resolve_next_action(stripe, &api, &intent_id, &secret).await;
//!     flow.apply(outcome);
//! }
//! ```

use async_trait::async_trait;

use crate::action::{ActionRequest, ActionResponse};
use crate::error::{FlowError, Result};
use crate::flow::FlowEvent;
use crate::intent::PaymentIntent;
use crate::readiness::Readiness;

/// Card tokenization (`stripe.createPaymentMethod`)
///
/// Implementations map a gateway rejection to [`FlowError::Tokenization`].
#[async_trait(?Send)]
pub trait CardTokenizer {
    /// Tokenize the mounted card input, returning the payment method id
    async fn create_payment_method(&self) -> Result<String>;
}

/// Client-side next action (`stripe.handleNextAction`)
#[async_trait(?Send)]
pub trait NextActionHandler {
    /// Resolves once any out-of-band verification has completed
    async fn handle_next_action(&self, client_secret: &str) -> Result<()>;
}

/// Transport to the server-side intent handler
#[async_trait(?Send)]
pub trait ActionTransport {
    async fn send(&self, request: &ActionRequest) -> Result<ActionResponse>;

    async fn retrieve_intent(&self, payment_intent_id: &str) -> Result<PaymentIntent>;
}

/// Tokenize the card and register it against a new intent
pub async fn register_card<C, T>(
    tokenizer: Readiness<C>,
    transport: &T,
    customer_id: Option<&str>,
) -> Result<FlowEvent>
where
    C: CardTokenizer,
    T: ActionTransport + ?Sized,
{
    let tokenizer = tokenizer.into_result()?;
    let customer_id = customer_id
        .filter(|id| !id.is_empty())
        .ok_or(FlowError::MissingIdentifier("customer_id"))?;

    let payment_method_id = tokenizer.create_payment_method().await?;
    tracing::debug!(payment_method_id = %payment_method_id, "Card tokenized");

    let request = ActionRequest::RegisterCard {
        payment_method_id,
        customer_id: customer_id.to_string(),
    };
    let response = transport.send(&request).await?;

    Ok(FlowEvent::CardRegistered(response.payment_intent))
}

/// Confirm the intent with the selected plan
pub async fn confirm_payment<T>(transport: &T, request: ActionRequest) -> Result<FlowEvent>
where
    T: ActionTransport + ?Sized,
{
    let ActionRequest::ConfirmPayment { .. } = &request else {
        return Err(FlowError::InvalidState("expected a confirm_payment request"));
    };

    let response = transport.send(&request).await?;
    Ok(FlowEvent::PaymentConfirmed(response.payment_intent))
}

/// Run the gateway's next action, then fetch the resulting intent
pub async fn resolve_next_action<H, T>(
    handler: Readiness<H>,
    transport: &T,
    payment_intent_id: &str,
    client_secret: &str,
) -> Result<FlowEvent>
where
    H: NextActionHandler,
    T: ActionTransport + ?Sized,
{
    let handler = handler.into_result()?;
    handler.handle_next_action(client_secret).await?;
    tracing::debug!(intent_id = %payment_intent_id, "Next action resolved");

    resume(transport, payment_intent_id).await
}

/// Reload an intent, e.g. after the return-url redirect
pub async fn resume<T>(transport: &T, payment_intent_id: &str) -> Result<FlowEvent>
where
    T: ActionTransport + ?Sized,
{
    if payment_intent_id.is_empty() {
        return Err(FlowError::MissingIdentifier("payment_intent_id"));
    }
    let intent = transport.retrieve_intent(payment_intent_id).await?;
    Ok(FlowEvent::IntentRetrieved(intent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionType;
    use crate::flow::{CheckoutFlow, FlowState};
    use crate::intent::{
        CardOptions, InstallmentPlan, Installments, PaymentIntentStatus, PaymentMethodOptions,
    };
    use crate::readiness::{client_readiness, NotReady};
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct MockStripe {
        tokenize: std::result::Result<String, String>,
        next_actions: RefCell<Vec<String>>,
    }

    impl MockStripe {
        fn ok() -> Self {
            Self {
                tokenize: Ok("pm_card_jp".into()),
                next_actions: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl<'a> CardTokenizer for &'a MockStripe {
        async fn create_payment_method(&self) -> Result<String> {
            self.tokenize.clone().map_err(FlowError::Tokenization)
        }
    }

    #[async_trait(?Send)]
    impl<'a> NextActionHandler for &'a MockStripe {
        async fn handle_next_action(&self, client_secret: &str) -> Result<()> {
            self.next_actions.borrow_mut().push(client_secret.to_string());
            Ok(())
        }
    }

    /// Replays queued intents and records every request
    #[derive(Default)]
    struct MockTransport {
        responses: RefCell<VecDeque<Result<Option<PaymentIntent>>>>,
        retrieved: RefCell<VecDeque<PaymentIntent>>,
        sent: RefCell<Vec<ActionRequest>>,
    }

    impl MockTransport {
        fn respond(&self, response: Result<Option<PaymentIntent>>) {
            self.responses.borrow_mut().push_back(response);
        }
    }

    #[async_trait(?Send)]
    impl ActionTransport for MockTransport {
        async fn send(&self, request: &ActionRequest) -> Result<ActionResponse> {
            self.sent.borrow_mut().push(request.clone());
            let payment_intent = self
                .responses
                .borrow_mut()
                .pop_front()
                .unwrap_or(Ok(None))?;
            Ok(ActionResponse { payment_intent })
        }

        async fn retrieve_intent(&self, payment_intent_id: &str) -> Result<PaymentIntent> {
            self.retrieved
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| FlowError::Request(format!("{payment_intent_id} not found")))
        }
    }

    fn intent(id: &str, status: PaymentIntentStatus) -> PaymentIntent {
        PaymentIntent {
            id: id.into(),
            client_secret: Some(format!("{id}_secret_xyz")),
            status: Some(status),
            amount: Some(100_000),
            currency: Some("jpy".into()),
            ..Default::default()
        }
    }

    fn plans_intent(id: &str) -> PaymentIntent {
        PaymentIntent {
            payment_method_options: Some(PaymentMethodOptions {
                card: Some(CardOptions {
                    installments: Some(Installments {
                        enabled: true,
                        available_plans: Some(vec![
                            InstallmentPlan::fixed(3, "month"),
                            InstallmentPlan::of_type("bonus"),
                        ]),
                        plan: None,
                    }),
                }),
            }),
            ..intent(id, PaymentIntentStatus::RequiresConfirmation)
        }
    }

    fn requires_action(id: &str) -> PaymentIntent {
        PaymentIntent {
            next_action: Some(serde_json::json!({ "type": "redirect_to_url" })),
            ..intent(id, PaymentIntentStatus::RequiresAction)
        }
    }

    #[tokio::test]
    async fn test_not_ready_is_silent_noop() {
        let transport = MockTransport::default();
        let outcome = register_card::<&MockStripe, _>(
            Readiness::NotReady(NotReady::CardElement),
            &transport,
            Some("cus_1"),
        )
        .await;

        assert_eq!(outcome, Err(FlowError::NotReady(NotReady::CardElement)));
        assert!(transport.sent.borrow().is_empty());

        let mut flow = CheckoutFlow::default();
        flow.apply(outcome);
        assert!(flow.error().is_none());
        assert_eq!(flow.state(), &FlowState::NoIntent);
    }

    #[tokio::test]
    async fn test_missing_customer_is_rejected() {
        let stripe = MockStripe::ok();
        let transport = MockTransport::default();
        let outcome = register_card(Readiness::Ready(&stripe), &transport, None).await;

        assert_eq!(outcome, Err(FlowError::MissingIdentifier("customer_id")));
        assert!(transport.sent.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_tokenization_error_stays_in_no_intent() {
        let stripe = MockStripe {
            tokenize: Err("Your card number is incomplete.".into()),
            next_actions: RefCell::new(Vec::new()),
        };
        let transport = MockTransport::default();
        let mut flow = CheckoutFlow::default();

        flow.begin();
        flow.apply(register_card(Readiness::Ready(&stripe), &transport, Some("cus_1")).await);

        assert_eq!(flow.state(), &FlowState::NoIntent);
        assert_eq!(flow.error(), Some("Your card number is incomplete."));
        assert!(transport.sent.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_request_failure_does_not_advance() {
        let stripe = MockStripe::ok();
        let transport = MockTransport::default();
        transport.respond(Err(FlowError::Request("502 Bad Gateway".into())));
        let mut flow = CheckoutFlow::default();

        flow.apply(register_card(Readiness::Ready(&stripe), &transport, Some("cus_1")).await);

        assert_eq!(flow.state(), &FlowState::NoIntent);
        assert_eq!(flow.error(), Some("Payment request failed. Please try again."));
    }

    #[tokio::test]
    async fn test_bonus_plan_scenario() {
        let stripe = MockStripe::ok();
        let transport = MockTransport::default();
        let mut flow = CheckoutFlow::default();

        transport.respond(Ok(Some(plans_intent("pi_1"))));
        flow.apply(register_card(Readiness::Ready(&stripe), &transport, Some("cus_1")).await);
        assert!(matches!(flow.state(), FlowState::AwaitingPlanConfirmation(_)));
        assert_eq!(
            transport.sent.borrow()[0],
            ActionRequest::RegisterCard {
                payment_method_id: "pm_card_jp".into(),
                customer_id: "cus_1".into(),
            }
        );

        let choices = flow.catalog().choices();
        assert_eq!(choices.len(), 3);
        let bonus_token = choices[2].0.clone();
        flow.select_plan(&bonus_token);

        transport.respond(Ok(Some(intent("pi_1", PaymentIntentStatus::Succeeded))));
        let request = flow.confirm_request().unwrap();
        flow.apply(confirm_payment(&transport, request).await);

        let sent = transport.sent.borrow();
        let confirm = &sent[1];
        assert_eq!(confirm.action_type(), ActionType::ConfirmPayment);
        let fields = confirm.form_fields();
        assert!(fields.contains(&("installments_plan_type", "bonus".to_string())));
        assert!(fields.contains(&("installments_plan_count", String::new())));
        assert!(fields.contains(&("installments_plan_interval", String::new())));

        assert!(matches!(flow.state(), FlowState::Settled(_)));
    }

    #[tokio::test]
    async fn test_next_action_invoked_once_with_client_secret() {
        let stripe = MockStripe::ok();
        let transport = MockTransport::default();
        let mut flow = CheckoutFlow::default();

        transport.respond(Ok(Some(plans_intent("pi_1"))));
        flow.apply(register_card(Readiness::Ready(&stripe), &transport, Some("cus_1")).await);

        transport.respond(Ok(Some(requires_action("pi_1"))));
        let request = flow.confirm_request().unwrap();
        flow.apply(confirm_payment(&transport, request).await);
        assert!(matches!(flow.state(), FlowState::AwaitingNextAction(_)));

        transport
            .retrieved
            .borrow_mut()
            .push_back(intent("pi_1", PaymentIntentStatus::Succeeded));

        // Re-renders while the next action is in flight
        let mut triggered = 0;
        for _ in 0..3 {
            if let Some(secret) = flow.take_next_action() {
                triggered += 1;
                let readiness = client_readiness(Some(&stripe));
                let outcome = resolve_next_action(readiness, &transport, "pi_1", &secret).await;
                flow.apply(outcome);
            }
        }

        assert_eq!(triggered, 1);
        assert_eq!(*stripe.next_actions.borrow(), vec!["pi_1_secret_xyz".to_string()]);
        assert!(matches!(flow.state(), FlowState::Settled(_)));
    }

    #[tokio::test]
    async fn test_sequential_intents_each_trigger_once() {
        let stripe = MockStripe::ok();
        let transport = MockTransport::default();
        let mut flow = CheckoutFlow::default();
        let mut triggers = 0;

        for id in ["pi_a", "pi_b"] {
            transport.respond(Ok(Some(plans_intent(id))));
            flow.apply(register_card(Readiness::Ready(&stripe), &transport, Some("cus_1")).await);

            transport.respond(Ok(Some(requires_action(id))));
            let request = flow.confirm_request().unwrap();
            flow.apply(confirm_payment(&transport, request).await);

            for _ in 0..2 {
                if flow.take_next_action().is_some() {
                    triggers += 1;
                }
            }
            flow.apply(Ok(FlowEvent::Reset));
        }

        assert_eq!(triggers, 2);
    }

    #[tokio::test]
    async fn test_resume_after_redirect() {
        let transport = MockTransport::default();
        transport
            .retrieved
            .borrow_mut()
            .push_back(intent("pi_1", PaymentIntentStatus::Succeeded));

        let mut flow = CheckoutFlow::default();
        flow.apply(resume(&transport, "pi_1").await);
        assert!(matches!(flow.state(), FlowState::Settled(_)));

        assert_eq!(
            resume(&transport, "").await,
            Err(FlowError::MissingIdentifier("payment_intent_id"))
        );
    }

    #[tokio::test]
    async fn test_confirm_rejects_register_request() {
        let transport = MockTransport::default();
        let request = ActionRequest::RegisterCard {
            payment_method_id: "pm_1".into(),
            customer_id: "cus_1".into(),
        };
        assert!(confirm_payment(&transport, request).await.is_err());
        assert!(transport.sent.borrow().is_empty());
    }
}
