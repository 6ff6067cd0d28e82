//! Error types for the HTA core library.
//!
//! The evidence extractor itself is infallible; these errors cover the
//! surrounding file export, configuration, and report rendering.

use std::path::PathBuf;

/// Top-level error type for hta-core.
#[derive(Debug, thiserror::Error)]
pub enum HtaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Template render error: {0}")]
    Template(#[from] handlebars::RenderError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

impl HtaError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Convenience result alias for hta-core.
pub type Result<T> = std::result::Result<T, HtaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HtaError::invalid_input("records must be a JSON array");
        assert_eq!(
            err.to_string(),
            "Invalid input: records must be a JSON array"
        );

        let err: HtaError = ConfigError::FileNotFound {
            path: PathBuf::from("/tmp/missing.toml"),
        }
        .into();
        assert!(err.to_string().contains("/tmp/missing.toml"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: HtaError = io.into();
        assert!(matches!(err, HtaError::Io(_)));
    }
}
