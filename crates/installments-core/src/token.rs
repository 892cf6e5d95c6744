//! Plan Selection Tokens
//!
//! A plan choice travels through a `<select>` value as a compact string.
//! Plans encode as `count-interval-type` with `0` standing in for an absent
//! count or interval. Paying in one go has its own token which never has
//! three segments, so it cannot collide with a plan.

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};
use crate::intent::InstallmentPlan;

/// Token for paying in full (no installments plan)
pub const ONE_TIME_TOKEN: &str = "one_time";

const ABSENT: &str = "0";

/// What the shopper picked in the plan selector
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanSelection {
    /// Pay in full; the confirm request carries no plan fields
    #[default]
    OneTime,
    Plan(InstallmentPlan),
}

impl PlanSelection {
    /// Encode into a selector token
    pub fn token(&self) -> String {
        match self {
            PlanSelection::OneTime => ONE_TIME_TOKEN.to_string(),
            PlanSelection::Plan(plan) => encode(plan),
        }
    }

    /// Decode a selector token
    pub fn from_token(token: &str) -> Result<Self> {
        if token == ONE_TIME_TOKEN {
            return Ok(PlanSelection::OneTime);
        }
        decode(token).map(PlanSelection::Plan)
    }

    /// Form fields for `confirm_payment`: (count, interval, type).
    /// All empty for a one-time payment.
    pub fn confirm_fields(&self) -> (String, String, String) {
        match self {
            PlanSelection::OneTime => (String::new(), String::new(), String::new()),
            PlanSelection::Plan(plan) => (
                plan.count.map(|c| c.to_string()).unwrap_or_default(),
                plan.interval.clone().unwrap_or_default(),
                plan.plan_type.clone(),
            ),
        }
    }

    pub fn plan(&self) -> Option<&InstallmentPlan> {
        match self {
            PlanSelection::OneTime => None,
            PlanSelection::Plan(plan) => Some(plan),
        }
    }
}

/// Encode a plan as `count-interval-type`.
///
/// A count of zero is not a plan the gateway offers and shares the absent
/// sentinel, so it encodes the same as no count.
pub fn encode(plan: &InstallmentPlan) -> String {
    let count = plan
        .count
        .map_or_else(|| ABSENT.to_string(), |c| c.to_string());
    let interval = plan.interval.as_deref().unwrap_or(ABSENT);
    format!("{count}-{interval}-{}", plan.plan_type)
}

/// Decode a `count-interval-type` token.
///
/// Count is the first segment and type the last, so an interval may itself
/// contain `-`. Plan types never do.
pub fn decode(token: &str) -> Result<InstallmentPlan> {
    let invalid = || FlowError::InvalidToken(token.to_string());
    let (count, rest) = token.split_once('-').ok_or_else(invalid)?;
    let (interval, plan_type) = rest.rsplit_once('-').ok_or_else(invalid)?;

    if plan_type.is_empty() {
        return Err(invalid());
    }

    let count = match count {
        ABSENT => None,
        c => Some(c.parse::<u64>().map_err(|_| invalid())?),
    };
    let interval = match interval {
        ABSENT | "" => None,
        i => Some(i.to_string()),
    };

    Ok(InstallmentPlan {
        count,
        interval,
        plan_type: plan_type.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_tokens_round_trip() {
        let plans = [
            InstallmentPlan::fixed(3, "month"),
            InstallmentPlan::fixed(24, "month"),
            InstallmentPlan::of_type("bonus"),
            InstallmentPlan::of_type("revolving"),
            InstallmentPlan {
                count: Some(6),
                interval: None,
                plan_type: "fixed_count".into(),
            },
            InstallmentPlan::fixed(3, "semi-month"),
            InstallmentPlan::fixed(12, "every-other-month"),
        ];

        for plan in plans {
            let selection = PlanSelection::Plan(plan);
            let decoded = PlanSelection::from_token(&selection.token()).unwrap();
            assert_eq!(decoded, selection);
        }
    }

    #[test]
    fn test_encoding_format() {
        assert_eq!(encode(&InstallmentPlan::fixed(3, "month")), "3-month-fixed_count");
        assert_eq!(encode(&InstallmentPlan::of_type("bonus")), "0-0-bonus");
    }

    #[test]
    fn test_one_time_decodes_to_empty_fields() {
        let selection = PlanSelection::from_token(ONE_TIME_TOKEN).unwrap();
        assert_eq!(selection, PlanSelection::OneTime);
        assert_eq!(
            selection.confirm_fields(),
            (String::new(), String::new(), String::new())
        );
    }

    #[test]
    fn test_single_count_plan_is_not_one_time() {
        let plan = InstallmentPlan::fixed(1, "month");
        let decoded = PlanSelection::from_token(&encode(&plan)).unwrap();
        assert_eq!(decoded, PlanSelection::Plan(plan));
    }

    #[test]
    fn test_bonus_confirm_fields() {
        let selection = PlanSelection::Plan(InstallmentPlan::of_type("bonus"));
        assert_eq!(
            selection.confirm_fields(),
            (String::new(), String::new(), "bonus".to_string())
        );
    }

    #[test]
    fn test_invalid_tokens() {
        assert!(decode("").is_err());
        assert!(decode("1").is_err());
        assert!(decode("x-month-fixed_count").is_err());
        assert!(decode("3-month-").is_err());
        assert!(decode("3-fixed_count").is_err());
    }

    #[test]
    fn test_hyphenated_interval_keeps_fields() {
        let plan = decode("3-semi-month-fixed_count").unwrap();
        assert_eq!(plan.count, Some(3));
        assert_eq!(plan.interval.as_deref(), Some("semi-month"));
        assert_eq!(plan.plan_type, "fixed_count");
    }

    #[test]
    fn test_zero_count_is_absent() {
        let plan = InstallmentPlan {
            count: Some(0),
            interval: None,
            plan_type: "bonus".into(),
        };
        assert_eq!(encode(&plan), "0-0-bonus");
        assert_eq!(decode("0-0-bonus").unwrap().count, None);
    }
}
