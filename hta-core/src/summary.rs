//! Evidence summaries and manuscript fragments built from extracted data
//! points.
//!
//! Everything here is a pure string builder. Statistics only consider values
//! that parse as numbers; anything else is skipped.

use handlebars::Handlebars;
use serde_json::json;

use crate::category::ProjectCategory;
use crate::error::Result;
use crate::extraction::{ExtractionKind, RuleSet};
use crate::table::metric_columns;
use crate::types::ExtractedDataPoint;

const MAX_SOURCES: usize = 5;
const MAX_TABLE_ROWS: usize = 10;
const SOURCE_TITLE_CHARS: usize = 50;
const TABLE_TITLE_CHARS: usize = 40;
const TABLE_DOI_CHARS: usize = 20;

/// Descriptive statistics over one metric's numeric values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Numeric values of `metric` across `points`, in order.
pub fn numeric_values(points: &[ExtractedDataPoint], metric: &str) -> Vec<f64> {
    points
        .iter()
        .filter_map(|p| p.get(metric))
        .filter_map(|v| v.trim().parse::<f64>().ok())
        .collect()
}

/// Stats for `metric`, or `None` when no value parses.
pub fn metric_stats(points: &[ExtractedDataPoint], metric: &str) -> Option<MetricStats> {
    let values = numeric_values(points, metric);
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(MetricStats {
        count: values.len(),
        mean: sum / values.len() as f64,
        min,
        max,
    })
}

/// The first `max_chars` characters of `s`.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

fn shorten(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        format!("{}...", truncate_chars(s, max_chars))
    } else {
        s.to_string()
    }
}

fn or_na(s: &str) -> &str {
    if s.trim().is_empty() { "N/A" } else { s }
}

/// `"survival_rate"` → `"Survival rate"`.
fn metric_label(metric: &str) -> String {
    let spaced = metric.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One-line mean summary over every all-numeric metric column.
pub fn literature_summary(points: &[ExtractedDataPoint]) -> String {
    if points.is_empty() {
        return "No quantitative data extracted from literature review.".to_string();
    }

    let parts: Vec<String> = metric_columns(points)
        .into_iter()
        .filter_map(|metric| {
            let present: Vec<&str> = points.iter().filter_map(|p| p.get(&metric)).collect();
            let all_numeric = present.iter().all(|v| v.trim().parse::<f64>().is_ok());
            if !all_numeric {
                return None;
            }
            metric_stats(points, &metric).map(|s| format!("Average {metric}: {:.2}", s.mean))
        })
        .collect();

    format!("Literature review findings: {}", parts.join("; "))
}

/// Category-specific ranges for the results section.
pub fn results_section(category: ProjectCategory, points: &[ExtractedDataPoint]) -> String {
    if points.is_empty() {
        return "No quantitative results available from literature review.".to_string();
    }

    let mut results = Vec::new();
    if category == ProjectCategory::HpvVaccine {
        if let Some(s) = metric_stats(points, "efficacy") {
            results.push(format!(
                "Vaccine efficacy ranged from {}% to {}% (mean: {:.1}%)",
                s.min, s.max, s.mean
            ));
        }
        if let Some(s) = metric_stats(points, "cost") {
            results.push(format!(
                "Vaccine costs ranged from ₹{} to ₹{} per dose",
                s.min, s.max
            ));
        }
    }

    if results.is_empty() {
        "Quantitative data analysis pending.".to_string()
    } else {
        results.join("\n")
    }
}

/// Bullet list of up to five source titles.
pub fn data_sources_section(points: &[ExtractedDataPoint]) -> String {
    if points.is_empty() {
        return "Data sources: Limited local data available; international estimates used where necessary."
            .to_string();
    }

    let sources: Vec<String> = points
        .iter()
        .filter(|p| !p.title.is_empty())
        .take(MAX_SOURCES)
        .map(|p| {
            format!(
                "- {}... ({})",
                truncate_chars(&p.title, SOURCE_TITLE_CHARS),
                or_na(&p.year)
            )
        })
        .collect();

    format!("Key data sources include:\n{}", sources.join("\n"))
}

fn format_parameter(
    category: ProjectCategory,
    rules: &RuleSet,
    metric: &str,
    value: &str,
) -> String {
    let label = metric_label(metric);
    match rules.kind_of(category, metric) {
        Some(ExtractionKind::Percentage) => format!("{label}: {value}%"),
        Some(ExtractionKind::Currency) => format!("{label}: ₹{value}"),
        None => format!("{label}: {value}"),
    }
}

/// Markdown table of up to ten studies and their extracted parameters.
///
/// Units come from whichever rule in `rules` produced each metric.
pub fn literature_table(
    category: ProjectCategory,
    rules: &RuleSet,
    points: &[ExtractedDataPoint],
) -> String {
    if points.is_empty() {
        return "**Table 1: Literature Data Sources**\n\n\
                | Study | Year | Key Findings |\n\
                |-------|------|--------------|\n\
                | No data available | - | - |"
            .to_string();
    }

    let mut rows = vec![
        "| Study | Year | Key Parameters | DOI |".to_string(),
        "|-------|------|----------------|-----|".to_string(),
    ];

    for point in points.iter().take(MAX_TABLE_ROWS) {
        let title = shorten(or_na(&point.title), TABLE_TITLE_CHARS).replace('|', "\\|");
        let doi = shorten(or_na(&point.doi), TABLE_DOI_CHARS).replace('|', "\\|");
        let params: Vec<String> = point
            .metrics
            .iter()
            .map(|m| format_parameter(category, rules, &m.name, &m.value))
            .collect();
        let params = if params.is_empty() {
            "Various parameters".to_string()
        } else {
            params.join("; ")
        };
        rows.push(format!(
            "| {} | {} | {} | {} |",
            title,
            or_na(&point.year),
            params,
            doi
        ));
    }

    format!("**Table 1: Summary of Literature Data Sources**\n\n{}", rows.join("\n"))
}

/// Numbered reference list.
pub fn references(points: &[ExtractedDataPoint]) -> String {
    if points.is_empty() {
        return "1. References to be added based on full systematic review.".to_string();
    }

    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mut reference = format!("{}. {} ({}).", i + 1, or_na(&p.title), or_na(&p.year));
            if !p.doi.trim().is_empty() {
                reference.push_str(&format!(" doi:{}", p.doi));
            }
            reference
        })
        .collect::<Vec<_>>()
        .join("\n")
}

const EVIDENCE_REPORT_TEMPLATE: &str = "\
# Literature Evidence: {{project}}

*Project type:* {{category_label}} (`{{category}}`)
*Generated:* {{generated_on}}
*Studies with extracted data:* {{study_count}}

## Summary of Findings

{{summary}}

## Results

{{results}}

## Data Sources

{{data_sources}}

{{table}}

## References

{{references}}
";

/// Markdown evidence section for a project, assembled from the fragments above.
pub fn render_evidence_report(
    project: &str,
    category: ProjectCategory,
    rules: &RuleSet,
    points: &[ExtractedDataPoint],
    generated_on: &str,
) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(false);
    handlebars.register_escape_fn(handlebars::no_escape);

    let variables = json!({
        "project": project,
        "category": category.as_str(),
        "category_label": category.label(),
        "generated_on": generated_on,
        "study_count": points.len(),
        "summary": literature_summary(points),
        "results": results_section(category, points),
        "data_sources": data_sources_section(points),
        "table": literature_table(category, rules, points),
        "references": references(points),
    });

    Ok(handlebars.render_template(EVIDENCE_REPORT_TEMPLATE, &variables)?)
}
