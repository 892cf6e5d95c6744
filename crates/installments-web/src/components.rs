//! UI Components

use installments_core::{client_readiness, orchestrator, CheckoutFlow, FlowState};
use leptos::prelude::*;

use crate::api::ApiClient;
use crate::stripe_js::{CardElement, StripeJs};

pub const CARD_ELEMENT_ID: &str = "card-element";

/// Stripe card input. Mounts once Stripe.js is available and calls
/// `on_complete` when the card becomes valid.
#[component]
pub fn CardField(
    flow: RwSignal<CheckoutFlow>,
    stripe: RwSignal<Option<StripeJs>, LocalStorage>,
    card: RwSignal<Option<CardElement>, LocalStorage>,
    on_complete: Callback<()>,
) -> impl IntoView {
    Effect::new(move |_| {
        let Some(stripe_js) = stripe.get() else {
            return;
        };
        if card.with_untracked(Option::is_some) {
            return;
        }

        match stripe_js.mount_card(&format!("#{CARD_ELEMENT_ID}")) {
            Ok(element) => {
                element.on_change(move |complete, error| {
                    let submit = flow
                        .try_update(|f| f.card_changed(complete, error.is_some()))
                        .unwrap_or(false);
                    if submit {
                        on_complete.run(());
                    }
                });
                card.set(Some(element));
            }
            Err(e) => leptos::logging::warn!("Card element failed to mount: {e:?}"),
        }
    });

    on_cleanup(move || {
        if let Some(element) = card.get_untracked() {
            element.destroy();
        }
        card.set(None);
    });

    view! { <div id=CARD_ELEMENT_ID class="card-element"></div> }
}

/// Installment plan selector; renders nothing when no plans are offered
#[component]
pub fn InstallmentPlanField(flow: RwSignal<CheckoutFlow>) -> impl IntoView {
    let offered = move || flow.with(|f| f.catalog().offers_installments);
    let choices = move || flow.with(|f| f.catalog().choices());

    view! {
        <Show when=offered>
            <div class="field">
                <label for="installments-plan">"Installments plan"</label>
                <select
                    id="installments-plan"
                    on:change=move |ev| flow.update(|f| f.select_plan(&event_target_value(&ev)))
                >
                    <For
                        each=choices
                        key=|(token, _)| token.clone()
                        children=move |(token, label)| {
                            let current = token.clone();
                            view! {
                                <option
                                    value=token
                                    selected=move || flow.with(|f| f.selection().token() == current)
                                >
                                    {label}
                                </option>
                            }
                        }
                    />
                </select>
            </div>
        </Show>
    }
}

/// Confirm button for the selected plan. Also drives the gateway's next
/// action, at most once per intent.
#[component]
pub fn ConfirmPayment(
    flow: RwSignal<CheckoutFlow>,
    stripe: RwSignal<Option<StripeJs>, LocalStorage>,
    api: StoredValue<ApiClient, LocalStorage>,
) -> impl IntoView {
    Effect::new(move |_| {
        if !flow.with(|f| matches!(f.state(), FlowState::AwaitingNextAction(_))) {
            return;
        }
        let Some(stripe_js) = stripe.get() else {
            return;
        };
        let Some(client_secret) = flow
            .try_update_untracked(CheckoutFlow::take_next_action)
            .flatten()
        else {
            return;
        };
        let intent_id = flow
            .with_untracked(|f| f.state().intent().map(|i| i.id.clone()))
            .unwrap_or_default();

        flow.update(CheckoutFlow::begin);
        let api = api.get_value();
        leptos::task::spawn_local(async move {
            let outcome = orchestrator::resolve_next_action(
                client_readiness(Some(stripe_js)),
                &api,
                &intent_id,
                &client_secret,
            )
            .await;
            flow.update(|f| f.apply(outcome));
        });
    });

    let confirm = move |_| {
        if flow.with_untracked(CheckoutFlow::is_pending) {
            return;
        }
        let request = match flow.with_untracked(CheckoutFlow::confirm_request) {
            Ok(request) => request,
            Err(e) => {
                flow.update(|f| f.apply(Err(e)));
                return;
            }
        };

        flow.update(CheckoutFlow::begin);
        let api = api.get_value();
        leptos::task::spawn_local(async move {
            let outcome = orchestrator::confirm_payment(&api, request).await;
            flow.update(|f| f.apply(outcome));
        });
    };

    let awaiting_plan = move || flow.with(|f| matches!(f.state(), FlowState::AwaitingPlanConfirmation(_)));

    view! {
        <Show when=awaiting_plan>
            <button
                class="btn btn-primary"
                disabled=move || flow.with(CheckoutFlow::is_pending)
                on:click=confirm
            >
                "Confirm payment"
            </button>
        </Show>
    }
}

/// Error slot
#[component]
pub fn ErrorMessage(flow: RwSignal<CheckoutFlow>) -> impl IntoView {
    move || {
        flow.with(|f| f.error().map(str::to_string)).map(|message| {
            view! { <p class="error" role="alert">{message}</p> }
        })
    }
}
