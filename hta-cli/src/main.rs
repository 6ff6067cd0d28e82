//! HTA CLI: literature evidence extraction for Health Technology Assessment projects.
//!
//! Runs the extractor over record files, or the full search → extract →
//! process pipeline over `hta_project_*` folders.

mod commands;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// hta: extract model parameters from HTA literature
#[derive(Parser, Debug)]
#[command(name = "hta", version, about, long_about = None)]
struct Cli {
    /// Workspace directory
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Extract data points from a JSON array of literature records
    Extract {
        /// Records file (JSON array)
        #[arg(short, long)]
        input: PathBuf,
        /// Project category tag (hpv_vaccine, ncd_screening, dialysis, mdrtb, ai_tb_cxr)
        #[arg(long)]
        category: String,
        /// Write the extracted table as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write the extracted data points as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Search PubMed for one project and write its data tables
    Search {
        /// Project directory
        #[arg(short, long)]
        project: PathBuf,
    },
    /// Fill the extraction template, update the model and write the report
    Process {
        /// Project directory
        #[arg(short, long)]
        project: PathBuf,
    },
    /// Search and process every project folder under a parent directory
    Run {
        /// Directory containing the project folders (defaults to the workspace)
        #[arg(long)]
        parent: Option<PathBuf>,
    },
    /// List the extraction rules for each category
    Categories,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create a default workspace configuration file
    Init,
    /// Show the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let log_dir = hta_core::config::log_dir();
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "hta.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    commands::handle_command(cli.command, &workspace, cli.config.as_deref()).await
}
