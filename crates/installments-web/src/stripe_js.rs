//! Stripe.js Bridge
//!
//! Thin wrappers over the Stripe.js v3 global loaded by `index.html`. Calls
//! go through `Reflect` so a missing or partially loaded script shows up as
//! `None`/`Err` instead of a panic. Raw card data never crosses this
//! boundary: we only see the element's completion signal and the resulting
//! payment method id.

use async_trait::async_trait;
use installments_core::orchestrator::{CardTokenizer, NextActionHandler};
use installments_core::{FlowError, Result};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::js_sys::{Array, Function, Object, Promise, Reflect};

/// `Stripe(publishableKey)` instance
#[derive(Clone, Debug)]
pub struct StripeJs {
    inner: JsValue,
}

/// Mounted `card` element
#[derive(Clone, Debug)]
pub struct CardElement {
    inner: JsValue,
}

impl StripeJs {
    /// Instantiate Stripe.js; `None` if the script has not loaded
    pub fn load(publishable_key: &str) -> Option<Self> {
        let window = JsValue::from(web_sys::window()?);
        let constructor = Reflect::get(&window, &"Stripe".into())
            .ok()?
            .dyn_into::<Function>()
            .ok()?;
        let inner = constructor
            .call1(&JsValue::NULL, &publishable_key.into())
            .ok()?;

        Some(Self { inner })
    }

    /// Create a card element and mount it into `selector`
    pub fn mount_card(&self, selector: &str) -> std::result::Result<CardElement, JsValue> {
        let elements = call(&self.inner, "elements", &[])?;
        let options = object(&[("hidePostalCode", JsValue::TRUE)])?;
        let card = call(&elements, "create", &["card".into(), options])?;
        call(&card, "mount", &[selector.into()])?;

        Ok(CardElement { inner: card })
    }

    async fn call_async(&self, method: &str, options: JsValue) -> std::result::Result<JsValue, String> {
        let promise = call(&self.inner, method, &[options])
            .and_then(JsCast::dyn_into::<Promise>)
            .map_err(|e| js_message(&e))?;
        let result = JsFuture::from(promise).await.map_err(|e| js_message(&e))?;

        match Reflect::get(&result, &"error".into()) {
            Ok(error) if !error.is_undefined() && !error.is_null() => Err(js_message(&error)),
            _ => Ok(result),
        }
    }
}

impl CardElement {
    /// Subscribe to change events as `(complete, error_message)`
    pub fn on_change(&self, mut callback: impl FnMut(bool, Option<String>) + 'static) {
        let listener = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            let complete = Reflect::get(&event, &"complete".into())
                .ok()
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            let error = Reflect::get(&event, &"error".into())
                .ok()
                .filter(|e| !e.is_undefined() && !e.is_null())
                .map(|e| js_message(&e));
            callback(complete, error);
        });

        if call(&self.inner, "on", &["change".into(), listener.as_ref().clone()]).is_ok() {
            // Owned by the element from here on
            listener.forget();
        }
    }

    pub fn destroy(&self) {
        let _ = call(&self.inner, "destroy", &[]);
    }
}

/// Tokenizer bound to a Stripe instance and its mounted card element
pub struct CardTokenizerJs {
    stripe: StripeJs,
    card: CardElement,
}

impl CardTokenizerJs {
    pub fn new((stripe, card): (StripeJs, CardElement)) -> Self {
        Self { stripe, card }
    }
}

#[async_trait(?Send)]
impl CardTokenizer for CardTokenizerJs {
    async fn create_payment_method(&self) -> Result<String> {
        let options = object(&[("type", "card".into()), ("card", self.card.inner.clone())])
            .map_err(|e| FlowError::Tokenization(js_message(&e)))?;
        let result = self
            .stripe
            .call_async("createPaymentMethod", options)
            .await
            .map_err(FlowError::Tokenization)?;

        Reflect::get(&result, &"paymentMethod".into())
            .and_then(|pm| Reflect::get(&pm, &"id".into()))
            .ok()
            .and_then(|id| id.as_string())
            .ok_or_else(|| FlowError::Tokenization("No payment method returned".into()))
    }
}

#[async_trait(?Send)]
impl NextActionHandler for StripeJs {
    async fn handle_next_action(&self, client_secret: &str) -> Result<()> {
        let options = object(&[("clientSecret", client_secret.into())])
            .map_err(|e| FlowError::NextAction(js_message(&e)))?;
        self.call_async("handleNextAction", options)
            .await
            .map(|_| ())
            .map_err(FlowError::NextAction)
    }
}

fn call(target: &JsValue, method: &str, args: &[JsValue]) -> std::result::Result<JsValue, JsValue> {
    let function = Reflect::get(target, &method.into())?.dyn_into::<Function>()?;
    let args: Array = args.iter().collect();
    Reflect::apply(&function, target, &args)
}

fn object(entries: &[(&str, JsValue)]) -> std::result::Result<JsValue, JsValue> {
    let object = Object::new();
    for (key, value) in entries {
        Reflect::set(&object, &(*key).into(), value)?;
    }
    Ok(object.into())
}

/// Best-effort message from a Stripe error object or JS exception
fn js_message(value: &JsValue) -> String {
    Reflect::get(value, &"message".into())
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| value.as_string())
        .unwrap_or_else(|| "Unexpected payment error".into())
}
