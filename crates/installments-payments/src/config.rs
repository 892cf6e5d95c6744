//! Checkout Configuration
//!
//! Everything is read from the environment (after `.env` is loaded by the
//! server binary).

use std::time::Duration;

use crate::error::{PaymentError, Result};

/// Demo checkout settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// Amount charged per payment, in the currency's minor unit
    pub amount: i64,

    /// Three-letter ISO currency code, lowercase
    pub currency: String,

    /// Where the gateway sends the shopper after out-of-band verification
    pub return_url: String,

    /// Stripe publishable key handed to the frontend
    pub publishable_key: Option<String>,

    /// Name given to the demo customer created per session
    pub customer_name: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            amount: 100_000,
            currency: "jpy".into(),
            return_url: "http://localhost:3000/".into(),
            publishable_key: None,
            customer_name: "Demo for card installments".into(),
        }
    }
}

impl CheckoutConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let amount = match std::env::var("DEMO_AMOUNT") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|a| *a > 0)
                .ok_or_else(|| PaymentError::Config(format!("DEMO_AMOUNT is not a positive integer: {raw}")))?,
            Err(_) => defaults.amount,
        };

        let currency = std::env::var("DEMO_CURRENCY")
            .map(|c| c.to_lowercase())
            .unwrap_or(defaults.currency);

        let return_url = std::env::var("PUBLIC_URL")
            .map(|url| format!("{}/", url.trim_end_matches('/')))
            .unwrap_or(defaults.return_url);

        Ok(Self {
            amount,
            currency,
            return_url,
            publishable_key: std::env::var("STRIPE_PUBLISHABLE_KEY").ok(),
            customer_name: defaults.customer_name,
        })
    }
}

/// Stripe API credentials and client settings
#[derive(Clone, Debug)]
pub struct StripeConfig {
    pub secret_key: String,
    pub timeout: Duration,
}

impl StripeConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            timeout: Duration::from_secs(20),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")
            .map_err(|_| PaymentError::Config("STRIPE_SECRET_KEY not set".into()))?;
        let timeout = std::env::var("STRIPE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map_or(Duration::from_secs(20), Duration::from_secs);

        Ok(Self {
            secret_key,
            timeout,
        })
    }
}
