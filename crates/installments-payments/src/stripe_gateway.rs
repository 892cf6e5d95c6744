//! Stripe Gateway
//!
//! Customers go through the `async-stripe` client. Payment Intents are
//! created, confirmed and retrieved with form-encoded calls so the
//! installments plan (including `bonus`/`revolving` plans that carry no
//! count) is sent exactly as the API documents it.

use async_trait::async_trait;
use installments_core::PaymentIntent;
use serde::Deserialize;
use stripe::{Client, CreateCustomer, Customer};

use crate::config::StripeConfig;
use crate::error::{PaymentError, Result};
use crate::gateway::{validate_intent_id, ConfirmIntent, CreateIntent, PaymentGateway};

const API_BASE: &str = "https://api.stripe.com/v1";

/// Stripe client wrapper
pub struct StripeGateway {
    client: Client,
    http: reqwest::Client,
    secret_key: String,
}

impl StripeGateway {
    /// Create a new Stripe gateway
    pub fn new(config: StripeConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::Config(e.to_string()))?;

        Ok(Self {
            client: Client::new(config.secret_key.clone()),
            http,
            secret_key: config.secret_key,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(StripeConfig::from_env()?)
    }

    async fn post_form(&self, path: &str, form: &[(String, String)]) -> Result<PaymentIntent> {
        let response = self
            .http
            .post(format!("{API_BASE}{path}"))
            .basic_auth(&self.secret_key, Some(""))
            .form(form)
            .send()
            .await?;

        read_intent(response).await
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_customer(&self, name: &str) -> Result<String> {
        let mut params = CreateCustomer::new();
        params.name = Some(name);

        let customer = Customer::create(&self.client, params).await?;
        tracing::info!(customer_id = %customer.id, "Created Stripe customer");

        Ok(customer.id.to_string())
    }

    async fn create_intent(&self, params: &CreateIntent) -> Result<PaymentIntent> {
        self.post_form("/payment_intents", &params.form()).await
    }

    async fn confirm_intent(&self, payment_intent_id: &str, params: &ConfirmIntent) -> Result<PaymentIntent> {
        let path = format!("/payment_intents/{}/confirm", validate_intent_id(payment_intent_id)?);
        self.post_form(&path, &params.form()).await
    }

    async fn retrieve_intent(&self, payment_intent_id: &str) -> Result<PaymentIntent> {
        let response = self
            .http
            .get(format!("{API_BASE}/payment_intents/{}", validate_intent_id(payment_intent_id)?))
            .basic_auth(&self.secret_key, Some(""))
            .send()
            .await?;

        read_intent(response).await
    }

    fn name(&self) -> &str {
        "Stripe"
    }
}

/// Stripe error envelope
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

async fn read_intent(response: reqwest::Response) -> Result<PaymentIntent> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<PaymentIntent>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = %status, "Stripe API error");
    Err(PaymentError::Stripe(error_message(&body, status.as_u16())))
}

fn error_message(body: &str, status: u16) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error }) => error
            .message
            .or(error.code)
            .unwrap_or_else(|| format!("HTTP {status}")),
        Err(_) => format!("HTTP {status}"),
    }
}
