//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use std::path::Path;

use hta_core::{
    EvidenceExtractor, ExtractionOutcome, HtaConfig, LiteratureRecord, ProjectCategory, Table,
};
use hta_tools::{PubMedClient, find_projects, perform_literature_search, process_project_data};

fn load_config(workspace: &Path, config_path: Option<&Path>) -> anyhow::Result<HtaConfig> {
    hta_core::load_config(Some(workspace), config_path)
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
}

/// Handle a CLI subcommand.
pub async fn handle_command(
    command: Commands,
    workspace: &Path,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    // Init must work even when an existing config layer fails to load.
    if let Commands::Config {
        action: ConfigAction::Init,
    } = command
    {
        return init_config(workspace);
    }
    let config = load_config(workspace, config_path)?;
    dispatch(command, workspace, &config).await
}

/// Run a subcommand against an already loaded configuration.
async fn dispatch(command: Commands, workspace: &Path, config: &HtaConfig) -> anyhow::Result<()> {
    match command {
        Commands::Extract {
            input,
            category,
            output,
            json,
        } => handle_extract(
            config,
            &input,
            &category,
            output.as_deref(),
            json.as_deref(),
        ),
        Commands::Search { project } => handle_search(config, &project).await,
        Commands::Process { project } => handle_process(config, &project),
        Commands::Run { parent } => {
            let parent = parent.unwrap_or_else(|| workspace.to_path_buf());
            handle_run(config, &parent).await
        }
        Commands::Categories => {
            print!("{}", format_rule_table(config));
            Ok(())
        }
        Commands::Config { action } => match action {
            ConfigAction::Init => init_config(workspace),
            ConfigAction::Show => {
                println!("{}", toml::to_string_pretty(config)?);
                Ok(())
            }
        },
    }
}

fn run_extraction(
    config: &HtaConfig,
    records: &[LiteratureRecord],
    tag: &str,
) -> (ProjectCategory, ExtractionOutcome) {
    let category = ProjectCategory::from_tag(tag);
    if !category.is_recognized() {
        tracing::warn!(tag, "Unrecognized category; no extraction rules apply");
    }
    let outcome = EvidenceExtractor::with_rules(category, config.rule_set()).extract_with_report(records);
    (category, outcome)
}

fn handle_extract(
    config: &HtaConfig,
    input: &Path,
    tag: &str,
    output: Option<&Path>,
    json: Option<&Path>,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(input)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", input.display(), e))?;
    let records = LiteratureRecord::list_from_json(&content)
        .map_err(|e| anyhow::anyhow!("{}: {}", input.display(), e))?;

    let (category, outcome) = run_extraction(config, &records, tag);

    println!(
        "Category: {} ({})\nRecords: {}  Retained: {}  Dropped: {}",
        category.label(),
        category,
        records.len(),
        outcome.data_points.len(),
        outcome.dropped.len()
    );
    for dropped in &outcome.dropped {
        println!(
            "  dropped #{} [{}]: {}",
            dropped.index, dropped.identifier, dropped.reason
        );
    }

    if let Some(path) = output {
        Table::from_data_points(&outcome.data_points).write_csv(path)?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = json {
        std::fs::write(path, serde_json::to_string_pretty(&outcome.data_points)?)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

async fn handle_search(config: &HtaConfig, project: &Path) -> anyhow::Result<()> {
    let client = PubMedClient::new(&config.pubmed)?;
    match perform_literature_search(project, &client, config).await? {
        Some(summary) => println!(
            "Search completed for {}. Found {} articles, extracted {} data points.",
            summary.project, summary.articles, summary.data_points
        ),
        None => println!("Skipped {}: no usable search strings.", project.display()),
    }
    Ok(())
}

fn handle_process(config: &HtaConfig, project: &Path) -> anyhow::Result<()> {
    match process_project_data(project, config)? {
        Some(summary) => {
            println!("Processed {}", summary.project);
            if let Some(rows) = summary.template_rows {
                println!("  extraction template: {rows} rows");
            }
            if let Some(model) = &summary.updated_model {
                println!("  updated model: {}", model.display());
            }
            println!("  report: {}", summary.report.display());
        }
        None => println!("Skipped {}: no extracted data.", project.display()),
    }
    Ok(())
}

async fn handle_run(config: &HtaConfig, parent: &Path) -> anyhow::Result<()> {
    let projects = find_projects(parent, &config.project.prefix)?;
    if projects.is_empty() {
        println!(
            "No {}* folders found in {}",
            config.project.prefix,
            parent.display()
        );
        return Ok(());
    }

    let client = PubMedClient::new(&config.pubmed)?;
    let mut failed = 0;
    for project in &projects {
        let result = async {
            perform_literature_search(project, &client, config).await?;
            process_project_data(project, config)
        }
        .await;

        match result {
            Ok(Some(summary)) => println!(
                "{}: {} data points, report at {}",
                summary.project,
                summary.data_points,
                summary.report.display()
            ),
            Ok(None) => println!("{}: skipped", project.display()),
            Err(e) => {
                failed += 1;
                tracing::error!(project = %project.display(), error = %e, "Project failed");
            }
        }
    }

    println!(
        "Completed {} of {} projects.",
        projects.len() - failed,
        projects.len()
    );
    Ok(())
}

fn format_rule_table(config: &HtaConfig) -> String {
    let rules = config.rule_set();
    let mut out = String::new();
    for category in ProjectCategory::RECOGNIZED {
        out.push_str(&format!("{} ({})\n", category.label(), category));
        for rule in rules.rules_for(category) {
            out.push_str(&format!(
                "  {:<18} {:<10} {}\n",
                rule.metric,
                rule.kind.as_str(),
                rule.triggers.join(", ")
            ));
        }
    }
    out
}

fn init_config(workspace: &Path) -> anyhow::Result<()> {
    let config_dir = workspace.join(".hta");
    std::fs::create_dir_all(&config_dir)?;

    let path = config_dir.join("config.toml");
    if path.exists() {
        println!("Configuration file already exists at: {}", path.display());
        return Ok(());
    }

    let toml_str = toml::to_string_pretty(&HtaConfig::default())?;
    std::fs::write(&path, &toml_str)?;
    println!("Created default configuration at: {}", path.display());
    Ok(())
}
