//! Installment Plan Catalog
//!
//! Turns a Payment Intent snapshot into the list of plan choices the
//! selector renders. Gateway order is preserved.

use serde::{Deserialize, Serialize};

use crate::intent::{InstallmentPlan, PaymentIntent};
use crate::token::{PlanSelection, ONE_TIME_TOKEN};

/// Display language for plan labels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ja,
}

impl Locale {
    pub fn from_language(tag: &str) -> Self {
        if tag.to_lowercase().starts_with("ja") {
            Locale::Ja
        } else {
            Locale::En
        }
    }

    pub fn one_time_label(&self) -> &'static str {
        match self {
            Locale::En => "One-time payment",
            Locale::Ja => "１回払い",
        }
    }

    fn bonus_label(&self) -> &'static str {
        match self {
            Locale::En => "Bonus payment",
            Locale::Ja => "ボーナス払い",
        }
    }

    fn revolving_label(&self) -> &'static str {
        match self {
            Locale::En => "Revolving payment",
            Locale::Ja => "リボルビング払い",
        }
    }

    fn count_label(&self, count: u64) -> String {
        match self {
            Locale::En => format!("{count} installments"),
            Locale::Ja => format!("{count}回払い"),
        }
    }
}

/// How a plan splits the payment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanKind {
    CountBased,
    Bonus,
    Revolving,
}

impl PlanKind {
    pub fn of(plan: &InstallmentPlan) -> Self {
        match plan.plan_type.as_str() {
            "bonus" => PlanKind::Bonus,
            "revolving" => PlanKind::Revolving,
            _ => PlanKind::CountBased,
        }
    }
}

/// A plan ready for display
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstallmentPlanOption {
    pub plan: InstallmentPlan,
    pub kind: PlanKind,
    pub label: String,
    pub token: String,
}

impl InstallmentPlanOption {
    pub fn new(plan: InstallmentPlan, locale: Locale) -> Self {
        let kind = PlanKind::of(&plan);
        let label = match kind {
            PlanKind::Bonus => locale.bonus_label().to_string(),
            PlanKind::Revolving => locale.revolving_label().to_string(),
            PlanKind::CountBased => locale.count_label(plan.count.unwrap_or_default()),
        };
        let token = PlanSelection::Plan(plan.clone()).token();

        Self {
            plan,
            kind,
            label,
            token,
        }
    }
}

/// Extracted plan catalog
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlanCatalog {
    pub offers_installments: bool,
    pub options: Vec<InstallmentPlanOption>,
    pub locale: Locale,
}

impl PlanCatalog {
    /// Extract the catalog from an intent snapshot
    pub fn from_intent(intent: Option<&PaymentIntent>, locale: Locale) -> Self {
        let options: Vec<_> = intent
            .map(PaymentIntent::available_plans)
            .unwrap_or_default()
            .iter()
            .cloned()
            .map(|plan| InstallmentPlanOption::new(plan, locale))
            .collect();

        Self {
            offers_installments: !options.is_empty(),
            options,
            locale,
        }
    }

    /// Selector entries as (token, label), one-time first.
    /// Empty when installments are not offered.
    pub fn choices(&self) -> Vec<(String, String)> {
        if !self.offers_installments {
            return Vec::new();
        }

        std::iter::once((
            ONE_TIME_TOKEN.to_string(),
            self.locale.one_time_label().to_string(),
        ))
        .chain(self.options.iter().map(|o| (o.token.clone(), o.label.clone())))
        .collect()
    }
}
