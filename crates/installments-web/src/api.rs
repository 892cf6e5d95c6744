//! API Client

use async_trait::async_trait;
use installments_core::orchestrator::ActionTransport;
use installments_core::{ActionRequest, ActionResponse, FlowError, PaymentIntent, Result};
use serde::Deserialize;

/// Checkout session bootstrap from `POST /api/customers`
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub customer_id: String,
    pub publishable_key: Option<String>,
}

/// Backend client rooted at the page origin
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    origin: String,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    pub fn new() -> Self {
        let origin = web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .unwrap_or_else(|| "http://localhost:3000".into());

        Self {
            http: reqwest::Client::new(),
            origin,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }

    /// Create the customer this checkout registers cards against
    pub async fn create_customer(&self) -> std::result::Result<Session, String> {
        let response = self
            .http
            .post(self.url("/api/customers"))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if response.status().is_success() {
            response.json().await.map_err(|e| e.to_string())
        } else {
            Err(error_message(response).await)
        }
    }
}

#[async_trait(?Send)]
impl ActionTransport for ApiClient {
    async fn send(&self, request: &ActionRequest) -> Result<ActionResponse> {
        let response = self
            .http
            .post(self.url("/api/action"))
            .form(&request.form_fields())
            .send()
            .await
            .map_err(|e| FlowError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FlowError::Request(error_message(response).await));
        }

        response
            .json()
            .await
            .map_err(|e| FlowError::Request(e.to_string()))
    }

    async fn retrieve_intent(&self, payment_intent_id: &str) -> Result<PaymentIntent> {
        let response = self
            .http
            .get(self.url(&format!("/api/payment_intents/{payment_intent_id}")))
            .send()
            .await
            .map_err(|e| FlowError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FlowError::Request(error_message(response).await));
        }

        let data: ActionResponse = response
            .json()
            .await
            .map_err(|e| FlowError::Request(e.to_string()))?;
        data.payment_intent
            .ok_or_else(|| FlowError::Request("No payment intent returned".into()))
    }
}

async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let data: serde_json::Value = response.json().await.unwrap_or_default();
    data["error"]
        .as_str()
        .map_or_else(|| format!("Request failed ({status})"), str::to_string)
}
