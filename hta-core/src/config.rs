//! Configuration system for the HTA pipeline.
//!
//! Uses `figment` for layered configuration: defaults -> user file ->
//! workspace file -> explicit file -> environment.

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::category::ProjectCategory;
use crate::error::ConfigError;
use crate::extraction::{ExtractionKind, ExtractionRule, RuleSet};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HtaConfig {
    #[serde(default)]
    pub pubmed: PubMedConfig,
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

/// PubMed E-utilities client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PubMedConfig {
    /// E-utilities base URL, with trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Contact address sent with every request, as NCBI asks.
    #[serde(default = "default_email")]
    pub email: String,
    /// Results requested per project search.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Identifiers beyond this count are never fetched.
    #[serde(default = "default_hard_limit")]
    pub hard_limit: usize,
    /// Identifiers per efetch request.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Flat pause after each efetch batch.
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for PubMedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            email: default_email(),
            max_results: default_max_results(),
            hard_limit: default_hard_limit(),
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/".to_string()
}

fn default_email() -> String {
    "hta-research@example.com".to_string()
}

fn default_max_results() -> usize {
    50
}

fn default_hard_limit() -> usize {
    100
}

fn default_batch_size() -> usize {
    20
}

fn default_batch_delay_ms() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// Project folder layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Folder-name prefix identifying project directories.
    #[serde(default = "default_project_prefix")]
    pub prefix: String,
    #[serde(default = "default_search_file")]
    pub search_file: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// File-name prefix of the project's model script.
    #[serde(default = "default_model_prefix")]
    pub model_prefix: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            prefix: default_project_prefix(),
            search_file: default_search_file(),
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
            model_prefix: default_model_prefix(),
        }
    }
}

fn default_project_prefix() -> String {
    "hta_project_".to_string()
}

fn default_search_file() -> String {
    "02_search_strings.txt".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_model_prefix() -> String {
    "04_".to_string()
}

/// Extraction rule configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Rules appended after the built-in rules of their category.
    #[serde(default)]
    pub custom_rules: Vec<CustomRule>,
}

/// A user-supplied extraction rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRule {
    pub category: ProjectCategory,
    pub triggers: Vec<String>,
    pub metric: String,
    pub kind: ExtractionKind,
}

impl HtaConfig {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pubmed.batch_size == 0 {
            return Err(ConfigError::Invalid {
                message: "pubmed.batch_size must be at least 1".to_string(),
            });
        }
        for rule in &self.extraction.custom_rules {
            if !rule.category.is_recognized() {
                return Err(ConfigError::Invalid {
                    message: format!(
                        "custom rule '{}' must target a recognized category",
                        rule.metric
                    ),
                });
            }
            if rule.metric.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    message: "custom rule metric name cannot be empty".to_string(),
                });
            }
            if rule.triggers.iter().all(|t| t.trim().is_empty()) {
                return Err(ConfigError::Invalid {
                    message: format!("custom rule '{}' needs at least one trigger", rule.metric),
                });
            }
        }
        Ok(())
    }

    /// Built-in rules extended with the configured custom rules.
    pub fn rule_set(&self) -> RuleSet {
        let mut rules = RuleSet::builtin();
        for custom in &self.extraction.custom_rules {
            let triggers: Vec<&str> = custom
                .triggers
                .iter()
                .map(String::as_str)
                .filter(|t| !t.trim().is_empty())
                .collect();
            rules.extend(
                custom.category,
                ExtractionRule::new(&triggers, &custom.metric, custom.kind),
            );
        }
        rules
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("org", "hta", "hta")
}

/// Path of the user-level config file, if a home directory is known.
pub fn user_config_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.toml"))
}

/// Directory for rolling log files.
pub fn log_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (`HTA_PUBMED__EMAIL`, `HTA_PROJECT__PREFIX`, ...)
/// 2. Explicit config file (`--config`)
/// 3. Workspace-local config (`.hta/config.toml`)
/// 4. User config (`~/.config/hta/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    explicit: Option<&Path>,
) -> Result<HtaConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(HtaConfig::default()));

    if let Some(user_config) = user_config_path()
        && user_config.exists()
    {
        figment = figment.merge(Toml::file(&user_config));
    }

    if let Some(ws) = workspace {
        let ws_config = ws.join(".hta").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("HTA_").split("__"));

    let config: HtaConfig = figment.extract().map_err(Box::new)?;
    config.validate()?;
    Ok(config)
}
