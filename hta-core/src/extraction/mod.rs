//! Evidence extraction: keyword-triggered, first-match numeric extraction from
//! abstract text.
//!
//! For each record the abstract is lower-cased and every rule of the active
//! category is evaluated independently. A firing rule scans the *whole*
//! abstract for its first percentage or currency match; there is no proximity
//! check between trigger and value, and no negation handling. Records that end
//! up with no metric beyond the four baseline fields are dropped, and the
//! reason is reported in [`ExtractionOutcome::dropped`].

pub mod patterns;
pub mod rules;

pub use patterns::{extract_currency, extract_percentage};
pub use rules::{ExtractionKind, ExtractionRule, RuleSet};

use serde::{Deserialize, Serialize};

use crate::category::ProjectCategory;
use crate::types::{ExtractedDataPoint, LiteratureRecord};

/// Why a record produced no data point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DropReason {
    /// The batch category has no rules.
    UnrecognizedCategory,
    /// The abstract was missing or blank.
    EmptyAbstract,
    /// No trigger keyword of the category occurs in the abstract.
    NoTrigger,
    /// Triggers fired, but the abstract holds no matching numeric value.
    TriggerWithoutValue { metrics: Vec<String> },
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::UnrecognizedCategory => write!(f, "unrecognized project category"),
            DropReason::EmptyAbstract => write!(f, "empty abstract"),
            DropReason::NoTrigger => write!(f, "no trigger keyword in abstract"),
            DropReason::TriggerWithoutValue { metrics } => write!(
                f,
                "trigger present but no numeric value for {}",
                metrics.join(", ")
            ),
        }
    }
}

/// A record that was removed from the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedRecord {
    /// Position of the record in the input batch.
    pub index: usize,
    pub identifier: String,
    #[serde(flatten)]
    pub reason: DropReason,
}

/// Result of extracting a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    /// Retained data points, in input order.
    pub data_points: Vec<ExtractedDataPoint>,
    /// Dropped records, in input order.
    pub dropped: Vec<DroppedRecord>,
}

impl ExtractionOutcome {
    pub fn total(&self) -> usize {
        self.data_points.len() + self.dropped.len()
    }
}

/// Applies one category's rules to a batch of records.
#[derive(Debug, Clone)]
pub struct EvidenceExtractor {
    category: ProjectCategory,
    rules: RuleSet,
}

impl EvidenceExtractor {
    /// Extractor over the built-in rule table.
    pub fn new(category: ProjectCategory) -> Self {
        Self::with_rules(category, RuleSet::builtin())
    }

    pub fn with_rules(category: ProjectCategory, rules: RuleSet) -> Self {
        Self { category, rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Derive the data point for one record, or the reason it is dropped.
    pub fn extract_record(
        &self,
        record: &LiteratureRecord,
    ) -> Result<ExtractedDataPoint, DropReason> {
        if !self.category.is_recognized() {
            return Err(DropReason::UnrecognizedCategory);
        }

        let lowered = record.abstract_text.to_lowercase();
        let mut point = ExtractedDataPoint::baseline(record);
        let mut fired = Vec::new();

        for rule in self.rules.rules_for(self.category) {
            if !rule.fires(&lowered) {
                continue;
            }
            fired.push(rule.metric.clone());
            if let Some(value) = rule.kind.extract(&lowered) {
                point.set(rule.metric.clone(), value);
            }
        }

        if point.is_informative() {
            Ok(point)
        } else if lowered.trim().is_empty() {
            Err(DropReason::EmptyAbstract)
        } else if fired.is_empty() {
            Err(DropReason::NoTrigger)
        } else {
            Err(DropReason::TriggerWithoutValue { metrics: fired })
        }
    }

    /// Extract a batch, keeping per-record drop reasons.
    pub fn extract_with_report(&self, records: &[LiteratureRecord]) -> ExtractionOutcome {
        let mut outcome = ExtractionOutcome::default();

        for (index, record) in records.iter().enumerate() {
            match self.extract_record(record) {
                Ok(point) => outcome.data_points.push(point),
                Err(reason) => {
                    tracing::debug!(
                        index,
                        identifier = %record.identifier,
                        category = %self.category,
                        %reason,
                        "Dropped literature record"
                    );
                    outcome.dropped.push(DroppedRecord {
                        index,
                        identifier: record.identifier.clone(),
                        reason,
                    });
                }
            }
        }

        tracing::info!(
            category = %self.category,
            records = records.len(),
            retained = outcome.data_points.len(),
            dropped = outcome.dropped.len(),
            "Evidence extraction complete"
        );
        outcome
    }

    /// Extract a batch, returning only the retained data points.
    pub fn extract(&self, records: &[LiteratureRecord]) -> Vec<ExtractedDataPoint> {
        self.extract_with_report(records).data_points
    }
}

/// Extract with the built-in rules for `category`.
pub fn extract_relevant_data(
    records: &[LiteratureRecord],
    category: ProjectCategory,
) -> Vec<ExtractedDataPoint> {
    EvidenceExtractor::new(category).extract(records)
}
