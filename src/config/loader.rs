use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::types::MviConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl MviConfig {
    /// Loads configuration from `path`.
    ///
    /// Returns an error if reading, parsing, or validation fails.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: MviConfig = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Like [`MviConfig::load_from`], but a missing file yields `MviConfig::default()`.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(MviConfig::default());
        }
        Self::load_from(path)
    }

    /// Validates the configuration.
    ///
    /// Checks that the logging filter is a valid `EnvFilter` directive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        EnvFilter::try_new(&self.logging.filter).map_err(|e| ConfigError::ValidationError {
            message: format!("Invalid logging filter '{}': {}", self.logging.filter, e),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn empty_file_uses_defaults() {
        let file = write_config("");
        let config = MviConfig::load_from(file.path()).unwrap();
        assert_eq!(config, MviConfig::default());
        assert_eq!(config.logging.filter, "info");
        assert!(config.logging.with_target);
    }

    #[test]
    fn parses_processor_section() {
        let file = write_config(
            r#"
[logging]
filter = "mvi_core=trace"

[processor]
trace_intents = true
warn_on_dropped_effects = true
"#,
        );
        let config = MviConfig::load_from(file.path()).unwrap();
        assert_eq!(config.logging.filter, "mvi_core=trace");
        assert!(config.processor.trace_intents);
        assert!(config.processor.warn_on_dropped_effects);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let file = write_config("[processor\ntrace_intents = true");
        let err = MviConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn invalid_filter_is_validation_error() {
        let file = write_config("[logging]\nfilter = \"mvi_core=notalevel\"\n");
        let err = MviConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert_eq!(MviConfig::load_or_default(&path).unwrap(), MviConfig::default());
        assert!(matches!(
            MviConfig::load_from(&path).unwrap_err(),
            ConfigError::ReadError { .. }
        ));
    }
}
