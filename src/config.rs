//! Configuration file support.
//!
//! Reads the consolidation settings from a TOML file (`consolidator.toml`)
//! and converts them into validated engine parameters. Configuration is
//! read once at the edge and threaded explicitly into the pipeline - there
//! is no process-wide settings state.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::algorithms::grouping::{ConfigurationError, GroupingParams};

/// Storage backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// In-memory store (tests, CLI runs over CSV snapshots).
    Local,
}

impl RepositoryType {
    /// Parses a repository type from its configuration string.
    pub fn parse(s: &str) -> Result<Self, ConfigurationError> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            other => Err(ConfigurationError::UnknownRepositoryType(other.to_string())),
        }
    }
}

/// Grouping settings as they appear in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupingSettings {
    /// Proximity window measured from a group's anchor departure.
    #[serde(default = "default_window_hours")]
    pub window_hours: i64,
    /// Maximum flight slots per consolidated row.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

/// Repository settings as they appear in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type", default = "default_repository_type")]
    pub repo_type: String,
}

fn default_window_hours() -> i64 {
    24
}

fn default_max_entries() -> usize {
    7
}

fn default_repository_type() -> String {
    "local".to_string()
}

impl Default for GroupingSettings {
    fn default() -> Self {
        Self {
            window_hours: default_window_hours(),
            max_entries: default_max_entries(),
        }
    }
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            repo_type: default_repository_type(),
        }
    }
}

/// Consolidator configuration loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsolidatorConfig {
    #[serde(default)]
    pub grouping: GroupingSettings,
    #[serde(default)]
    pub repository: RepositorySettings,
}

impl ConsolidatorConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Returns
    /// * `Ok(ConsolidatorConfig)` if the file reads and parses
    /// * `Err(ConfigurationError)` otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigurationError::File(format!(
                "failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::File(format!("failed to parse config: {}", e)))
    }

    /// Loads configuration from the default location.
    ///
    /// Searches for `consolidator.toml` in the current directory, then the
    /// parent directory. Falls back to defaults when no file exists.
    pub fn from_default_location() -> Result<Self, ConfigurationError> {
        let search_paths = [
            PathBuf::from("consolidator.toml"),
            PathBuf::from("../consolidator.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Converts the file settings into validated grouping parameters.
    pub fn grouping_params(&self) -> Result<GroupingParams, ConfigurationError> {
        GroupingParams::new(self.grouping.window_hours, self.grouping.max_entries)
    }

    /// The configured storage backend.
    pub fn repository_type(&self) -> Result<RepositoryType, ConfigurationError> {
        RepositoryType::parse(&self.repository.repo_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_source_system() {
        let config = ConsolidatorConfig::default();
        let params = config.grouping_params().unwrap();

        assert_eq!(params.window_hours, 24);
        assert_eq!(params.max_entries, 7);
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[grouping]
window_hours = 12
max_entries = 3

[repository]
type = "local"
"#;

        let config: ConsolidatorConfig = toml::from_str(toml).unwrap();
        let params = config.grouping_params().unwrap();

        assert_eq!(params.window_hours, 12);
        assert_eq!(params.max_entries, 3);
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let toml = r#"
[grouping]
window_hours = 48
"#;

        let config: ConsolidatorConfig = toml::from_str(toml).unwrap();
        let params = config.grouping_params().unwrap();

        assert_eq!(params.window_hours, 48);
        assert_eq!(params.max_entries, 7);
    }

    #[test]
    fn test_invalid_window_rejected_on_conversion() {
        let toml = r#"
[grouping]
window_hours = 0
"#;

        let config: ConsolidatorConfig = toml::from_str(toml).unwrap();
        assert!(config.grouping_params().is_err());
    }

    #[test]
    fn test_unknown_repository_type_rejected() {
        let toml = r#"
[repository]
type = "oracle"
"#;

        let config: ConsolidatorConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.repository_type(),
            Err(ConfigurationError::UnknownRepositoryType(
                "oracle".to_string()
            ))
        );
    }
}
