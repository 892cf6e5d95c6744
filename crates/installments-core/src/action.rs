//! Intent Handler Actions
//!
//! The two requests the browser sends to the server-side intent handler,
//! and the response shape both share. Requests travel form-encoded with an
//! `action_type` discriminator.

use serde::{Deserialize, Serialize};

use crate::intent::PaymentIntent;
use crate::token::PlanSelection;

/// `action_type` discriminator values
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    RegisterCard,
    ConfirmPayment,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::RegisterCard => "register_card",
            ActionType::ConfirmPayment => "confirm_payment",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "register_card" => Some(ActionType::RegisterCard),
            "confirm_payment" => Some(ActionType::ConfirmPayment),
            _ => None,
        }
    }
}

/// Outgoing request to the intent handler
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionRequest {
    RegisterCard {
        payment_method_id: String,
        customer_id: String,
    },
    ConfirmPayment {
        payment_intent_id: String,
        plan: PlanSelection,
    },
}

impl ActionRequest {
    pub fn action_type(&self) -> ActionType {
        match self {
            ActionRequest::RegisterCard { .. } => ActionType::RegisterCard,
            ActionRequest::ConfirmPayment { .. } => ActionType::ConfirmPayment,
        }
    }

    /// Form fields, in submission order.
    ///
    /// A one-time confirm carries no `installments_plan_*` fields at all.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("action_type", self.action_type().as_str().to_string())];

        match self {
            ActionRequest::RegisterCard {
                payment_method_id,
                customer_id,
            } => {
                fields.push(("payment_method_id", payment_method_id.clone()));
                fields.push(("customer_id", customer_id.clone()));
            }
            ActionRequest::ConfirmPayment {
                payment_intent_id,
                plan,
            } => {
                fields.push(("payment_intent_id", payment_intent_id.clone()));
                if let PlanSelection::Plan(_) = plan {
                    let (count, interval, plan_type) = plan.confirm_fields();
                    fields.push(("installments_plan_count", count));
                    fields.push(("installments_plan_interval", interval));
                    fields.push(("installments_plan_type", plan_type));
                }
            }
        }

        fields
    }
}

/// Response body shared by every intent handler action
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    #[serde(default)]
    pub payment_intent: Option<PaymentIntent>,
}
