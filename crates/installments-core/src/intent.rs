//! Payment Intent Snapshot
//!
//! The subset of a Stripe Payment Intent this system reads. Snapshots are
//! owned by the gateway; we only ever deserialize what create/confirm/retrieve
//! calls return. Unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// Payment Intent status as reported by the gateway
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
}

impl PaymentIntentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresAction => "requires_action",
            Self::Processing => "processing",
            Self::RequiresCapture => "requires_capture",
            Self::Canceled => "canceled",
            Self::Succeeded => "succeeded",
        }
    }
}

impl std::fmt::Display for PaymentIntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only Payment Intent snapshot
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Gateway identifier (`pi_...`)
    pub id: String,

    /// Client secret used by Stripe.js to drive next actions
    #[serde(default)]
    pub client_secret: Option<String>,

    #[serde(default)]
    pub status: Option<PaymentIntentStatus>,

    /// Amount in the currency's minor unit
    #[serde(default)]
    pub amount: Option<i64>,

    #[serde(default)]
    pub currency: Option<String>,

    /// Opaque next-action descriptor; only its presence matters here
    #[serde(default)]
    pub next_action: Option<serde_json::Value>,

    #[serde(default)]
    pub payment_method_options: Option<PaymentMethodOptions>,
}

impl PaymentIntent {
    /// Client secret, if the intent is waiting on a client-side next action
    pub fn pending_next_action(&self) -> Option<&str> {
        match (&self.next_action, &self.client_secret) {
            (Some(action), Some(secret)) if !action.is_null() && !secret.is_empty() => {
                Some(secret.as_str())
            }
            _ => None,
        }
    }

    /// Installments capability block, if the gateway returned one
    pub fn installments(&self) -> Option<&Installments> {
        self.payment_method_options
            .as_ref()?
            .card
            .as_ref()?
            .installments
            .as_ref()
    }

    /// Plans the card supports; empty when installments are not offered
    pub fn available_plans(&self) -> &[InstallmentPlan] {
        self.installments()
            .and_then(|i| i.available_plans.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethodOptions {
    #[serde(default)]
    pub card: Option<CardOptions>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CardOptions {
    #[serde(default)]
    pub installments: Option<Installments>,
}

/// `payment_method_options.card.installments`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Installments {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub available_plans: Option<Vec<InstallmentPlan>>,

    /// Plan chosen at confirmation time
    #[serde(default)]
    pub plan: Option<InstallmentPlan>,
}

/// A single installments plan as the gateway describes it
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstallmentPlan {
    #[serde(default)]
    pub count: Option<u64>,

    #[serde(default)]
    pub interval: Option<String>,

    /// `fixed_count`, `bonus` or `revolving`
    #[serde(rename = "type")]
    pub plan_type: String,
}

impl InstallmentPlan {
    pub fn fixed(count: u64, interval: impl Into<String>) -> Self {
        Self {
            count: Some(count),
            interval: Some(interval.into()),
            plan_type: "fixed_count".into(),
        }
    }

    /// A plan with no count or interval (bonus, revolving)
    pub fn of_type(plan_type: impl Into<String>) -> Self {
        Self {
            count: None,
            interval: None,
            plan_type: plan_type.into(),
        }
    }
}
