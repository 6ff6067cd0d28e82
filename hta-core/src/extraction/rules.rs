//! Declarative per-category extraction rules.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::patterns::{extract_currency, extract_percentage};
use crate::category::ProjectCategory;

/// Which numeric matcher a rule uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionKind {
    Percentage,
    Currency,
}

impl ExtractionKind {
    pub fn extract(&self, text: &str) -> Option<String> {
        match self {
            ExtractionKind::Percentage => extract_percentage(text),
            ExtractionKind::Currency => extract_currency(text),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionKind::Percentage => "percentage",
            ExtractionKind::Currency => "currency",
        }
    }
}

/// One `(triggers → metric → matcher)` entry.
///
/// The rule fires when any trigger occurs as a substring of the lower-cased
/// abstract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRule {
    pub triggers: Vec<String>,
    pub metric: String,
    pub kind: ExtractionKind,
}

impl ExtractionRule {
    pub fn new(triggers: &[&str], metric: &str, kind: ExtractionKind) -> Self {
        Self {
            triggers: triggers.iter().map(|t| t.to_lowercase()).collect(),
            metric: metric.to_string(),
            kind,
        }
    }

    pub fn percentage(triggers: &[&str], metric: &str) -> Self {
        Self::new(triggers, metric, ExtractionKind::Percentage)
    }

    pub fn currency(triggers: &[&str], metric: &str) -> Self {
        Self::new(triggers, metric, ExtractionKind::Currency)
    }

    /// `lowered` must already be lower-cased.
    pub fn fires(&self, lowered: &str) -> bool {
        self.triggers.iter().any(|t| lowered.contains(t.as_str()))
    }
}

/// Mapping from category to its ordered rule list.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: HashMap<ProjectCategory, Vec<ExtractionRule>>,
}

impl RuleSet {
    /// The fixed built-in table.
    pub fn builtin() -> Self {
        use ProjectCategory::*;

        let mut rules = HashMap::new();
        rules.insert(
            HpvVaccine,
            vec![
                ExtractionRule::percentage(&["efficacy", "effectiveness"], "efficacy"),
                ExtractionRule::currency(&["cost", "price"], "cost"),
                ExtractionRule::percentage(&["coverage", "uptake"], "coverage"),
            ],
        );
        rules.insert(
            NcdScreening,
            vec![
                ExtractionRule::percentage(&["sensitivity"], "sensitivity"),
                ExtractionRule::percentage(&["specificity"], "specificity"),
                ExtractionRule::currency(&["cost"], "cost"),
            ],
        );
        rules.insert(
            Dialysis,
            vec![
                ExtractionRule::percentage(&["survival"], "survival_rate"),
                ExtractionRule::currency(&["cost"], "cost_per_session"),
            ],
        );
        rules.insert(
            Mdrtb,
            vec![
                ExtractionRule::percentage(&["success", "cure"], "success_rate"),
                ExtractionRule::currency(&["cost"], "cost"),
            ],
        );
        rules.insert(
            AiTbCxr,
            vec![
                ExtractionRule::percentage(&["accuracy"], "accuracy"),
                ExtractionRule::percentage(&["sensitivity"], "sensitivity"),
                ExtractionRule::percentage(&["specificity"], "specificity"),
            ],
        );
        Self { rules }
    }

    /// Append `rule` after the existing rules for `category`.
    ///
    /// Returns `false` (and stores nothing) for [`ProjectCategory::General`],
    /// which never carries rules.
    pub fn extend(&mut self, category: ProjectCategory, mut rule: ExtractionRule) -> bool {
        if !category.is_recognized() {
            tracing::warn!(
                metric = %rule.metric,
                "Ignoring extraction rule for the general category"
            );
            return false;
        }
        for trigger in &mut rule.triggers {
            *trigger = trigger.to_lowercase();
        }
        self.rules.entry(category).or_default().push(rule);
        true
    }

    pub fn rules_for(&self, category: ProjectCategory) -> &[ExtractionRule] {
        if !category.is_recognized() {
            return &[];
        }
        self.rules.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Matcher kind for `metric` under `category`, if any rule produces it.
    pub fn kind_of(&self, category: ProjectCategory, metric: &str) -> Option<ExtractionKind> {
        self.rules_for(category)
            .iter()
            .find(|r| r.metric == metric)
            .map(|r| r.kind)
    }
}
