//! Category-specific extraction templates and model parameter substitution.

use crate::category::ProjectCategory;
use crate::summary::{metric_stats, truncate_chars};
use crate::table::Table;
use crate::types::ExtractedDataPoint;

const COUNTRY: &str = "India";
const NOTES_TITLE_CHARS: usize = 50;

/// How a template column is filled.
enum Cell {
    StudyId,
    Year,
    Notes,
    /// Copied from the named metric, empty when absent.
    Metric(&'static str),
    Fixed(&'static str),
}

fn template_columns(category: ProjectCategory) -> Option<Vec<(&'static str, Cell)>> {
    use Cell::*;

    let columns = match category {
        ProjectCategory::HpvVaccine => vec![
            ("study_id", StudyId),
            ("year", Year),
            ("country", Fixed(COUNTRY)),
            ("population", Fixed("Girls 9-14 years")),
            ("vaccine_type", Fixed("HPV vaccine")),
            ("doses", Fixed("2")),
            ("efficacy", Metric("efficacy")),
            ("coverage", Metric("coverage")),
            ("cancer_incidence_base", Fixed("")),
            ("vaccine_price_inr", Metric("cost")),
            ("delivery_cost_inr", Fixed("")),
            ("treatment_cost_cancer_inr", Fixed("")),
            ("model_type", Fixed("Markov")),
            ("outcome_measure", Fixed("ICER (INR/QALY)")),
            ("icer_inr_per_qaly", Fixed("")),
            ("notes", Notes),
        ],
        ProjectCategory::NcdScreening => vec![
            ("study_id", StudyId),
            ("year", Year),
            ("country", Fixed(COUNTRY)),
            ("population", Fixed("Adults 30-60 years")),
            ("intervention", Fixed("NCD screening")),
            ("sensitivity", Metric("sensitivity")),
            ("specificity", Metric("specificity")),
            ("cost_per_screening", Metric("cost")),
            ("prevalence", Fixed("")),
            ("ICER", Fixed("")),
            ("notes", Notes),
        ],
        ProjectCategory::Dialysis => vec![
            ("study_id", StudyId),
            ("year", Year),
            ("country", Fixed(COUNTRY)),
            ("population", Fixed("ESRD patients")),
            ("modality", Fixed("PD vs HD")),
            ("survival_rate", Metric("survival_rate")),
            ("cost_per_session", Metric("cost_per_session")),
            ("qaly_gain", Fixed("")),
            ("icer", Fixed("")),
            ("notes", Notes),
        ],
        ProjectCategory::Mdrtb => vec![
            ("study_id", StudyId),
            ("year", Year),
            ("country", Fixed(COUNTRY)),
            ("population", Fixed("MDR-TB patients")),
            ("intervention", Fixed("BPaLM regimen")),
            ("success_rate", Metric("success_rate")),
            ("cost_per_treatment", Metric("cost")),
            ("qaly_gain", Fixed("")),
            ("icer", Fixed("")),
            ("notes", Notes),
        ],
        ProjectCategory::AiTbCxr => vec![
            ("study_id", StudyId),
            ("year", Year),
            ("country", Fixed(COUNTRY)),
            ("population", Fixed("TB suspects")),
            ("ai_system", Fixed("CAD4TB or similar")),
            ("accuracy", Metric("accuracy")),
            ("sensitivity", Metric("sensitivity")),
            ("specificity", Metric("specificity")),
            ("cost_per_scan", Fixed("")),
            ("cases_detected", Fixed("")),
            ("icer", Fixed("")),
            ("notes", Notes),
        ],
        ProjectCategory::General => return None,
    };
    Some(columns)
}

/// Fill the category's extraction template, one row per data point.
///
/// Returns `None` for the general category and for an empty batch.
pub fn fill_extraction_template(
    category: ProjectCategory,
    points: &[ExtractedDataPoint],
) -> Option<Table> {
    let Some(columns) = template_columns(category) else {
        tracing::warn!(%category, "No extraction template for project type");
        return None;
    };
    if points.is_empty() {
        return None;
    }

    let mut table = Table::new(columns.iter().map(|(header, _)| *header));
    for (idx, point) in points.iter().enumerate() {
        let row = columns
            .iter()
            .map(|(_, cell)| match cell {
                Cell::StudyId if point.identifier.is_empty() => format!("PMID_{idx}"),
                Cell::StudyId => point.identifier.clone(),
                Cell::Year => point.year.clone(),
                Cell::Notes => format!(
                    "Data from PubMed: {}...",
                    truncate_chars(&point.title, NOTES_TITLE_CHARS)
                ),
                Cell::Metric(name) => point.get(name).unwrap_or_default().to_string(),
                Cell::Fixed(value) => (*value).to_string(),
            })
            .collect();
        table.push_row(row);
    }

    tracing::info!(%category, rows = table.len(), "Filled extraction template");
    Some(table)
}

const HPV_RR_LINE: &str = "vaccine_rr = 0.3   # 70% protection → RR = 0.3";
const HPV_COST_LINE: &str = "cost_vaccine_per_person = 800  # INR, 2 doses @ 400 each";

/// Substitute literature-derived parameters into a model script.
///
/// Only the HPV model has substitution points; other categories return the
/// source unchanged.
pub fn update_model_parameters(
    category: ProjectCategory,
    model_source: &str,
    points: &[ExtractedDataPoint],
) -> String {
    let mut updated = model_source.to_string();
    if category != ProjectCategory::HpvVaccine {
        return updated;
    }

    if let Some(efficacy) = metric_stats(points, "efficacy") {
        let line = format!(
            "vaccine_rr = {:.3}   # {:.1}% efficacy from literature",
            1.0 - efficacy.mean / 100.0,
            efficacy.mean
        );
        updated = updated.replace(HPV_RR_LINE, &line);
    }

    if let Some(cost) = metric_stats(points, "cost") {
        let line = format!(
            "cost_vaccine_per_person = {:.0}  # INR from literature",
            cost.mean
        );
        updated = updated.replace(HPV_COST_LINE, &line);
    }

    updated
}
