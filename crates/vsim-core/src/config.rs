//! Simulator configuration.
//!
//! Both structs deserialize from one TOML document:
//!
//! ```toml
//! recent_task_limit = 10
//! event_history_limit = 1000
//! datastore_root = "/var/tmp/vsim"
//!
//! [model]
//! datacenter = 1
//! cluster = 1
//! cluster_host = 3
//! host = 1
//! datastore = 1
//! machine = 2
//! ```
//!
//! Every key is optional; missing keys take the [`Default`] values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The document is not valid TOML or has wrongly typed keys.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Runtime settings of a [`Simulator`](crate::Simulator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// How many task references each entity keeps in its recent-task list.
    pub recent_task_limit: usize,

    /// How many events the event log retains before dropping the oldest.
    pub event_history_limit: usize,

    /// Directory under which the model builder creates datastore backing
    /// directories.
    pub datastore_root: Option<PathBuf>,

    /// Shape of the generated inventory.
    pub model: ModelConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            recent_task_limit: 10,
            event_history_limit: 1000,
            datastore_root: None,
            model: ModelConfig::default(),
        }
    }
}

impl SimulatorConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed documents.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Sets the datastore root directory.
    #[must_use]
    pub fn with_datastore_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.datastore_root = Some(root.into());
        self
    }
}

/// Shape of an inventory generated by [`Model`](crate::model::Model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Number of datacenters.
    pub datacenter: usize,
    /// Clusters per datacenter.
    pub cluster: usize,
    /// Hosts per cluster.
    pub cluster_host: usize,
    /// Standalone hosts per datacenter.
    pub host: usize,
    /// Local datastores per datacenter.
    pub datastore: usize,
    /// Virtual machines per compute resource.
    pub machine: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            datacenter: 1,
            cluster: 1,
            cluster_host: 3,
            host: 1,
            datastore: 1,
            machine: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = SimulatorConfig::from_toml_str("").unwrap();
        assert_eq!(config, SimulatorConfig::default());
        assert_eq!(config.recent_task_limit, 10);
        assert_eq!(config.event_history_limit, 1000);
        assert!(config.datastore_root.is_none());
    }

    #[test]
    fn partial_model_table_keeps_other_defaults() {
        let config = SimulatorConfig::from_toml_str(
            r#"
            recent_task_limit = 3
            datastore_root = "/tmp/vsim"

            [model]
            cluster_host = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.recent_task_limit, 3);
        assert_eq!(config.datastore_root, Some(PathBuf::from("/tmp/vsim")));
        assert_eq!(config.model.cluster_host, 5);
        assert_eq!(config.model.machine, 2);
    }

    #[test]
    fn wrongly_typed_key_is_a_parse_error() {
        let err = SimulatorConfig::from_toml_str("recent_task_limit = \"ten\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = SimulatorConfig::load("/nonexistent/vsim/config.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
