//! Checkout Page

use installments_core::{
    card_readiness, orchestrator, CheckoutFlow, FlowError, FlowEvent, Locale,
};
use leptos::prelude::*;

use crate::api::ApiClient;
use crate::components::{CardField, ConfirmPayment, ErrorMessage, InstallmentPlanField};
use crate::stripe_js::{CardElement, CardTokenizerJs, StripeJs};

#[component]
pub fn CheckoutPage() -> impl IntoView {
    let flow = RwSignal::new(CheckoutFlow::new(browser_locale()));
    let customer_id = RwSignal::new(None::<String>);
    let stripe = RwSignal::new_local(None::<StripeJs>);
    let card = RwSignal::new_local(None::<CardElement>);
    let api = StoredValue::new_local(ApiClient::new());

    // Session bootstrap, then pick up an intent handed back via the return url
    {
        let api = api.get_value();
        leptos::task::spawn_local(async move {
            match api.create_customer().await {
                Ok(session) => {
                    customer_id.set(Some(session.customer_id));
                    stripe.set(session.publishable_key.as_deref().and_then(StripeJs::load));
                }
                Err(e) => flow.update(|f| f.apply(Err(FlowError::Request(e)))),
            }

            if let Some(payment_intent_id) = returned_intent_id() {
                flow.update(CheckoutFlow::begin);
                let outcome = orchestrator::resume(&api, &payment_intent_id).await;
                flow.update(|f| f.apply(outcome));
            }
        });
    }

    let register = Callback::new(move |()| {
        let customer = customer_id.get_untracked();
        if !flow.with_untracked(|f| f.can_register(customer.as_deref())) {
            return;
        }

        let tokenizer =
            card_readiness(stripe.get_untracked(), card.get_untracked()).map(CardTokenizerJs::new);
        flow.update(CheckoutFlow::begin);
        let api = api.get_value();
        leptos::task::spawn_local(async move {
            let outcome = orchestrator::register_card(tokenizer, &api, customer.as_deref()).await;
            flow.update(|f| f.apply(outcome));
        });
    });

    let can_register = move || {
        let customer = customer_id.get();
        flow.with(|f| f.can_register(customer.as_deref()))
    };

    // Only re-render the step when the state kind changes
    let stage = Memo::new(move |_| flow.with(|f| f.state().name()));

    let body = move || match stage.get() {
        "no_intent" => view! {
            <div class="field">
                <label for="card-element">"Card"</label>
                <CardField flow=flow stripe=stripe card=card on_complete=register />
            </div>
            <button
                class="btn btn-primary"
                disabled=move || !can_register()
                on:click=move |_| register.run(())
            >
                "Continue"
            </button>
        }
        .into_any(),
        "awaiting_plan_confirmation" => view! {
            <InstallmentPlanField flow=flow />
            <ConfirmPayment flow=flow stripe=stripe api=api />
        }
        .into_any(),
        "awaiting_next_action" => view! {
            <p class="status">"Completing verification…"</p>
            <ConfirmPayment flow=flow stripe=stripe api=api />
        }
        .into_any(),
        _ => view! { <Settled flow=flow /> }.into_any(),
    };

    view! {
        <div class="checkout">
            <h1>"Card installments"</h1>
            <ErrorMessage flow=flow />
            {body}
        </div>
    }
}

/// Final intent summary with a way back to a fresh checkout
#[component]
fn Settled(flow: RwSignal<CheckoutFlow>) -> impl IntoView {
    let summary = move || {
        flow.with(|f| {
            f.state()
                .intent()
                .map(|i| {
                    (
                        i.amount.map(|a| a.to_string()).unwrap_or_default(),
                        i.currency.as_deref().unwrap_or_default().to_uppercase(),
                        i.status.map(|s| s.to_string()).unwrap_or_else(|| "unknown".into()),
                    )
                })
        })
    };

    view! {
        <div class="result">
            {move || {
                summary()
                    .map(|(amount, currency, status)| {
                        view! {
                            <p class="amount">{amount} " " {currency}</p>
                            <p class="status">"Status: " {status}</p>
                        }
                    })
            }}
            <button class="btn" on:click=move |_| flow.update(|f| f.apply(Ok(FlowEvent::Reset)))>
                "New payment"
            </button>
        </div>
    }
}

fn browser_locale() -> Locale {
    web_sys::window()
        .and_then(|w| w.navigator().language())
        .map_or_else(Locale::default, |tag| Locale::from_language(&tag))
}

/// `payment_intent` query parameter appended by the gateway redirect
fn returned_intent_id() -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    web_sys::UrlSearchParams::new_with_str(&search)
        .ok()?
        .get("payment_intent")
        .filter(|id| !id.is_empty())
}
