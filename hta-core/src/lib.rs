//! # HTA Core
//!
//! Core library for HTA literature evidence extraction.
//! Provides the literature data model, project categories, the evidence
//! extractor and its rule table, extraction-template filling, evidence
//! summaries, flat-table export, and configuration.

pub mod category;
pub mod config;
pub mod error;
pub mod extraction;
pub mod summary;
pub mod table;
pub mod template;
pub mod types;

// Re-export commonly used types at the crate root.
pub use category::ProjectCategory;
pub use config::{HtaConfig, load_config};
pub use error::{ConfigError, HtaError, Result};
pub use extraction::{
    DropReason, DroppedRecord, EvidenceExtractor, ExtractionKind, ExtractionOutcome,
    ExtractionRule, RuleSet, extract_relevant_data,
};
pub use table::Table;
pub use template::{fill_extraction_template, update_model_parameters};
pub use types::{ExtractedDataPoint, LiteratureRecord, MetricValue};
