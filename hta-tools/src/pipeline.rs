//! Per-project literature pipeline: search, extract, fill templates, report.
//!
//! A project is a directory named `hta_project_*`. The search step reads its
//! search-strings file and writes the raw and extracted tables under
//! `data/`; the process step turns the extracted data into a filled
//! extraction template, an updated model script and an evidence report.

use std::path::{Path, PathBuf};

use hta_core::summary::render_evidence_report;
use hta_core::{
    EvidenceExtractor, ExtractedDataPoint, HtaConfig, ProjectCategory, Table,
    fill_extraction_template, update_model_parameters,
};
use serde::Serialize;

use crate::error::Result;
use crate::pubmed::LiteratureSource;
use crate::search_strings::extract_pubmed_query;

pub const RAW_RESULTS_FILE: &str = "search_results_raw.csv";
pub const EXTRACTED_CSV_FILE: &str = "extracted_data.csv";
pub const EXTRACTED_JSON_FILE: &str = "extracted_data.json";
pub const FILLED_TEMPLATE_FILE: &str = "extraction_filled.csv";
pub const REPORT_FILE: &str = "evidence_report.md";

/// Outcome of the search step for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchSummary {
    pub project: String,
    pub category: ProjectCategory,
    pub query: String,
    pub articles: usize,
    pub data_points: usize,
    pub dropped: usize,
}

/// Outcome of the process step for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessSummary {
    pub project: String,
    pub category: ProjectCategory,
    pub data_points: usize,
    /// Rows in the filled extraction template, if the category has one.
    pub template_rows: Option<usize>,
    pub updated_model: Option<PathBuf>,
    pub report: PathBuf,
}

fn project_name(project_dir: &Path) -> String {
    project_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Project directories under `parent` whose names start with `prefix`, sorted.
pub fn find_projects(parent: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let mut projects = Vec::new();
    for entry in std::fs::read_dir(parent)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() && entry.file_name().to_string_lossy().starts_with(prefix) {
            projects.push(path);
        }
    }
    projects.sort();
    Ok(projects)
}

/// Search the literature for one project and write its data tables.
///
/// Returns `Ok(None)` when the project has no search-strings file or no
/// usable PubMed query.
pub async fn perform_literature_search(
    project_dir: &Path,
    source: &dyn LiteratureSource,
    config: &HtaConfig,
) -> Result<Option<SearchSummary>> {
    let project = project_name(project_dir);
    let search_file = project_dir.join(&config.project.search_file);
    if !search_file.exists() {
        tracing::warn!(project = %project, file = %search_file.display(), "No search strings file");
        return Ok(None);
    }

    let content = tokio::fs::read_to_string(&search_file).await?;
    let Some(query) = extract_pubmed_query(&content) else {
        tracing::warn!(project = %project, "Could not extract a PubMed query");
        return Ok(None);
    };

    let category = ProjectCategory::from_project_name(&project);
    tracing::info!(project = %project, %category, query = %query, "Starting literature search");

    let records = source
        .search_and_fetch(&query, config.pubmed.max_results)
        .await?;
    let outcome =
        EvidenceExtractor::with_rules(category, config.rule_set()).extract_with_report(&records);

    let data_dir = project_dir.join(&config.project.data_dir);
    std::fs::create_dir_all(&data_dir)?;
    Table::from_records(&records).write_csv(&data_dir.join(RAW_RESULTS_FILE))?;

    // The JSON always reflects this run so a later process step never sees
    // points from an earlier search.
    std::fs::write(
        data_dir.join(EXTRACTED_JSON_FILE),
        serde_json::to_string_pretty(&outcome.data_points)?,
    )?;
    let extracted_csv = data_dir.join(EXTRACTED_CSV_FILE);
    if outcome.data_points.is_empty() {
        if extracted_csv.exists() {
            std::fs::remove_file(&extracted_csv)?;
        }
    } else {
        Table::from_data_points(&outcome.data_points).write_csv(&extracted_csv)?;
    }

    let summary = SearchSummary {
        project,
        category,
        query,
        articles: records.len(),
        data_points: outcome.data_points.len(),
        dropped: outcome.dropped.len(),
    };
    tracing::info!(
        project = %summary.project,
        articles = summary.articles,
        data_points = summary.data_points,
        "Search completed"
    );
    Ok(Some(summary))
}

/// First `{model_prefix}*.py` script in the project, skipping earlier outputs.
fn find_model_script(project_dir: &Path, model_prefix: &str) -> Result<Option<PathBuf>> {
    let mut scripts: Vec<PathBuf> = std::fs::read_dir(project_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "py"))
        .filter(|path| {
            path.file_stem()
                .map(|s| s.to_string_lossy())
                .is_some_and(|stem| stem.starts_with(model_prefix) && !stem.ends_with("_updated"))
        })
        .collect();
    scripts.sort();
    Ok(scripts.into_iter().next())
}

/// Turn a project's extracted data into its template, model and report.
///
/// Returns `Ok(None)` when the search step produced no extracted data or
/// retained no data points.
pub fn process_project_data(
    project_dir: &Path,
    config: &HtaConfig,
) -> Result<Option<ProcessSummary>> {
    let project = project_name(project_dir);
    let data_dir = project_dir.join(&config.project.data_dir);
    let extracted = data_dir.join(EXTRACTED_JSON_FILE);
    if !extracted.exists() {
        tracing::warn!(project = %project, "No extracted data found");
        return Ok(None);
    }

    let points: Vec<ExtractedDataPoint> =
        serde_json::from_str(&std::fs::read_to_string(&extracted)?)?;
    if points.is_empty() {
        tracing::warn!(project = %project, "Extracted data is empty");
        return Ok(None);
    }
    let category = ProjectCategory::from_project_name(&project);
    tracing::info!(project = %project, %category, data_points = points.len(), "Processing project data");

    let template_rows = match fill_extraction_template(category, &points) {
        Some(table) => {
            table.write_csv(&data_dir.join(FILLED_TEMPLATE_FILE))?;
            Some(table.len())
        }
        None => None,
    };

    let mut updated_model = None;
    if template_rows.is_some() {
        match find_model_script(project_dir, &config.project.model_prefix)? {
            Some(script) => {
                let source = std::fs::read_to_string(&script)?;
                let updated = update_model_parameters(category, &source, &points);
                let stem = script
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let path = project_dir.join(format!("{stem}_updated.py"));
                std::fs::write(&path, updated)?;
                tracing::info!(project = %project, model = %path.display(), "Updated model script");
                updated_model = Some(path);
            }
            None => tracing::debug!(project = %project, "No model script found"),
        }
    }

    let generated_on = chrono::Local::now().format("%Y-%m-%d").to_string();
    let rules = config.rule_set();
    let report = render_evidence_report(&project, category, &rules, &points, &generated_on)?;
    let output_dir = project_dir.join(&config.project.output_dir);
    std::fs::create_dir_all(&output_dir)?;
    let report_path = output_dir.join(REPORT_FILE);
    std::fs::write(&report_path, report)?;

    Ok(Some(ProcessSummary {
        project,
        category,
        data_points: points.len(),
        template_rows,
        updated_model,
        report: report_path,
    }))
}
