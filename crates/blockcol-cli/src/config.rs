//! Configuration file support for the CLI.
//!
//! Loads CLI configuration from TOML files. Reader settings live in a
//! `[reader]` table:
//!
//! ```toml
//! output_format = "json"
//! limit = 100
//!
//! [reader]
//! prune_blocks = true
//! max_footer_len = 1048576
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blockcol_common::config::ReaderConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Default output format.
    #[serde(default = "default_format")]
    pub output_format: String,

    /// Default row limit for `scan`.
    #[serde(default)]
    pub limit: Option<usize>,

    /// Reader settings.
    #[serde(default)]
    pub reader: ReaderConfig,
}

fn default_format() -> String {
    "table".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            output_format: default_format(),
            limit: None,
            reader: ReaderConfig::default(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config
            .reader
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid [reader] section in {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Loads the default configuration file, or defaults if there is none.
    ///
    /// Looks in `~/.config/blockcol/config.toml`.
    pub fn load_default() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Returns the default configuration file path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("blockcol").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.output_format, "table");
        assert_eq!(config.limit, None);
        assert!(config.reader.prune_blocks);
    }

    #[test]
    fn test_parse_config() {
        let config: CliConfig = toml::from_str(
            r#"
            output_format = "csv"
            limit = 10

            [reader]
            filter_rows = true
            "#,
        )
        .unwrap();
        assert_eq!(config.output_format, "csv");
        assert_eq!(config.limit, Some(10));
        assert!(config.reader.filter_rows);
        assert!(config.reader.case_insensitive_columns);
    }

    #[test]
    fn test_from_file_rejects_invalid_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[reader]\narena_segment_size = 1\n").unwrap();
        assert!(CliConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = CliConfig {
            limit: Some(5),
            ..Default::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: CliConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
