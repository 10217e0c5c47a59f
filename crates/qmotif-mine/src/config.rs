//! Miner configuration.
//!
//! Sources, lowest to highest precedence:
//! 1. Default values
//! 2. A YAML configuration file
//! 3. Environment variables (with QMOTIF_ prefix)
//!
//! Command-line flags are applied on top by the caller before validating.

use std::path::{Path, PathBuf};

use qmotif_graph::{GraphMode, TargetPolicy};
use serde::{Deserialize, Serialize};

use crate::canon::LabelMode;

/// Complete mining configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MinerConfig {
    /// Smallest subgraph size mined
    #[serde(default = "default_k_min")]
    pub k_min: usize,

    /// Largest subgraph size mined
    #[serde(default = "default_k_max")]
    pub k_max: usize,

    /// Samples drawn per graph and size
    #[serde(default = "default_samples")]
    pub samples: usize,

    /// Enumerate every connected subgraph instead of sampling
    #[serde(default)]
    pub exact: bool,

    /// Graph representation
    #[serde(default)]
    pub mode: GraphMode,

    /// Samples per worker task
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Patterns reported per size
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Patterns rendered per size
    #[serde(default = "default_render_top")]
    pub render_top: usize,

    /// Worker threads (all cores when unset)
    #[serde(default)]
    pub workers: Option<usize>,

    /// Run seed (drawn from entropy when unset)
    #[serde(default)]
    pub seed: Option<u64>,

    /// Input file extension used when walking directories
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Split hash collisions with an exact isomorphism check
    #[serde(default)]
    pub verify_collisions: bool,

    /// Which wire of a multi-wire operation receives interaction edges
    #[serde(default)]
    pub target_policy: TargetPolicy,

    /// Labeling strategy (derived from `mode` when unset)
    #[serde(default)]
    pub label_mode: Option<LabelMode>,

    /// Root directory for rendered patterns
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_k_min() -> usize {
    2
}

fn default_k_max() -> usize {
    3
}

fn default_samples() -> usize {
    2000
}

fn default_chunk_size() -> usize {
    500
}

fn default_top_n() -> usize {
    5
}

fn default_render_top() -> usize {
    3
}

fn default_extension() -> String {
    "qasm".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("patterns")
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            k_min: default_k_min(),
            k_max: default_k_max(),
            samples: default_samples(),
            exact: false,
            mode: GraphMode::default(),
            chunk_size: default_chunk_size(),
            top_n: default_top_n(),
            render_top: default_render_top(),
            workers: None,
            seed: None,
            extension: default_extension(),
            verify_collisions: false,
            target_policy: TargetPolicy::default(),
            label_mode: None,
            output_dir: default_output_dir(),
        }
    }
}

impl MinerConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.display())))?;

        serde_yaml_ng::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))
    }

    /// File (or defaults) with environment overrides applied.
    ///
    /// Not validated; callers apply their own overrides first.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.merge_env()
    }

    /// Apply `QMOTIF_*` environment variables.
    pub fn merge_env(self) -> Result<Self, ConfigError> {
        self.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Only variables the lookup returns override the current values. A
    /// variable that is set but unparsable is an error.
    pub fn merge_env_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
        where
            T::Err: std::fmt::Display,
        {
            value
                .parse()
                .map_err(|e| ConfigError::ParseError(format!("{key}={value}: {e}")))
        }

        if let Some(v) = lookup("QMOTIF_K_MIN") {
            self.k_min = parsed("QMOTIF_K_MIN", &v)?;
        }
        if let Some(v) = lookup("QMOTIF_K_MAX") {
            self.k_max = parsed("QMOTIF_K_MAX", &v)?;
        }
        if let Some(v) = lookup("QMOTIF_SAMPLES") {
            self.samples = parsed("QMOTIF_SAMPLES", &v)?;
        }
        if let Some(v) = lookup("QMOTIF_EXACT") {
            self.exact = parsed("QMOTIF_EXACT", &v)?;
        }
        if let Some(v) = lookup("QMOTIF_MODE") {
            self.mode = parsed("QMOTIF_MODE", &v)?;
        }
        if let Some(v) = lookup("QMOTIF_CHUNK_SIZE") {
            self.chunk_size = parsed("QMOTIF_CHUNK_SIZE", &v)?;
        }
        if let Some(v) = lookup("QMOTIF_WORKERS") {
            self.workers = Some(parsed("QMOTIF_WORKERS", &v)?);
        }
        if let Some(v) = lookup("QMOTIF_SEED") {
            self.seed = Some(parsed("QMOTIF_SEED", &v)?);
        }
        if let Some(v) = lookup("QMOTIF_TARGET_POLICY") {
            self.target_policy = parsed("QMOTIF_TARGET_POLICY", &v)?;
        }
        if let Some(v) = lookup("QMOTIF_LABEL_MODE") {
            self.label_mode = Some(parsed("QMOTIF_LABEL_MODE", &v)?);
        }
        if let Some(v) = lookup("QMOTIF_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }

        Ok(self)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.k_min == 0 {
            return Err(ConfigError::ValidationError(
                "k_min must be at least 1".to_string(),
            ));
        }
        if self.k_min > self.k_max {
            return Err(ConfigError::ValidationError(format!(
                "k_min ({}) must not exceed k_max ({})",
                self.k_min, self.k_max
            )));
        }
        if self.samples == 0 {
            return Err(ConfigError::ValidationError(
                "samples must be greater than 0".to_string(),
            ));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.top_n < self.render_top {
            return Err(ConfigError::ValidationError(format!(
                "render_top ({}) must not exceed top_n ({})",
                self.render_top, self.top_n
            )));
        }
        if self.workers == Some(0) {
            return Err(ConfigError::ValidationError(
                "workers must be greater than 0".to_string(),
            ));
        }
        if self.extension.is_empty() {
            return Err(ConfigError::ValidationError(
                "extension must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Labeling strategy in effect.
    pub fn label_mode(&self) -> LabelMode {
        self.label_mode.unwrap_or_else(|| LabelMode::for_mode(self.mode))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = MinerConfig::default();
        assert_eq!(config.k_min, 2);
        assert_eq!(config.k_max, 3);
        assert_eq!(config.samples, 2000);
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.top_n, 5);
        assert_eq!(config.render_top, 3);
        assert_eq!(config.extension, "qasm");
        assert_eq!(config.output_dir, PathBuf::from("patterns"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_label_mode_follows_graph_mode() {
        let mut config = MinerConfig::default();
        assert_eq!(config.label_mode(), LabelMode::ByOperationName);
        config.mode = GraphMode::Comm;
        assert_eq!(config.label_mode(), LabelMode::ByEdgeRole);
        config.label_mode = Some(LabelMode::ByOperationName);
        assert_eq!(config.label_mode(), LabelMode::ByOperationName);
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let mut config = MinerConfig::default();
        config.k_min = 4;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let mut config = MinerConfig::default();
        config.k_min = 0;
        assert!(config.validate().is_err());

        let mut config = MinerConfig::default();
        config.chunk_size = 0;
        assert!(config.validate().is_err());

        let mut config = MinerConfig::default();
        config.render_top = 6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_with_partial_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "k_min: 3\nk_max: 4\nmode: comm\ntarget_policy: first-wire").unwrap();

        let config = MinerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.k_min, 3);
        assert_eq!(config.k_max, 4);
        assert_eq!(config.mode, GraphMode::Comm);
        assert_eq!(config.target_policy, TargetPolicy::FirstWire);
        assert_eq!(config.samples, 2000);
    }

    #[test]
    fn test_from_file_unknown_field() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "k_minimum: 3").unwrap();
        assert!(matches!(
            MinerConfig::from_file(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            MinerConfig::from_file("/nonexistent/qmotif.yaml"),
            Err(ConfigError::IoError(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = MinerConfig::default()
            .merge_env_from(env(&[
                ("QMOTIF_K_MAX", "5"),
                ("QMOTIF_SEED", "42"),
                ("QMOTIF_MODE", "comm"),
                ("QMOTIF_LABEL_MODE", "by-operation-name"),
            ]))
            .unwrap();
        assert_eq!(config.k_max, 5);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.mode, GraphMode::Comm);
        assert_eq!(config.label_mode(), LabelMode::ByOperationName);
        assert_eq!(config.k_min, 2);
    }

    #[test]
    fn test_env_parse_error() {
        let err = MinerConfig::default()
            .merge_env_from(env(&[("QMOTIF_SAMPLES", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("QMOTIF_SAMPLES=lots"));
    }
}
