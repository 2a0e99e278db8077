use crate::defaults;
use crate::error::{Result, VoxfixError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub lexicon: LexiconConfig,
    pub rules: RulesConfig,
    pub reranker: RerankerConfig,
    pub batch: BatchConfig,
}

/// Name lexicon location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LexiconConfig {
    pub path: PathBuf,
}

/// Rule transform tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RulesConfig {
    pub name_threshold: f64,
    pub scorer: ScorerKind,
}

/// Similarity function used for name correction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScorerKind {
    /// Insertion/deletion ratio (200 * LCS / total length).
    Indel,
    /// Normalized Levenshtein similarity scaled to 0..=100.
    Levenshtein,
}

/// Masked language model configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RerankerConfig {
    pub model: String,
    pub max_length: usize,
}

/// Batch driver configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BatchConfig {
    pub workers: usize,
    pub on_error: ErrorPolicy,
}

/// What the batch driver does when scoring a record fails
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop the whole run with the first scoring error.
    Abort,
    /// Report the record and continue with the next one.
    Skip,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(defaults::DEFAULT_LEXICON_PATH),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            name_threshold: defaults::NAME_MATCH_THRESHOLD,
            scorer: ScorerKind::Indel,
        }
    }
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            max_length: defaults::MAX_LENGTH,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: defaults::WORKERS,
            on_error: ErrorPolicy::Abort,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VoxfixError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                VoxfixError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(VoxfixError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.rules.name_threshold) {
            return Err(VoxfixError::ConfigInvalidValue {
                key: "rules.name_threshold".to_string(),
                message: format!(
                    "must be between 0 and 100, got {}",
                    self.rules.name_threshold
                ),
            });
        }
        if self.reranker.max_length < defaults::MIN_MAX_LENGTH {
            return Err(VoxfixError::ConfigInvalidValue {
                key: "reranker.max_length".to_string(),
                message: format!(
                    "must be at least {}, got {}",
                    defaults::MIN_MAX_LENGTH,
                    self.reranker.max_length
                ),
            });
        }
        if self.reranker.model.trim().is_empty() {
            return Err(VoxfixError::ConfigInvalidValue {
                key: "reranker.model".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.batch.workers == 0 {
            return Err(VoxfixError::ConfigInvalidValue {
                key: "batch.workers".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - VOXFIX_MODEL → reranker.model
    /// - VOXFIX_LEXICON → lexicon.path
    /// - VOXFIX_WORKERS → batch.workers (ignored unless a positive integer)
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("VOXFIX_MODEL") {
            if !model.is_empty() {
                self.reranker.model = model;
            }
        }

        if let Ok(lexicon) = std::env::var("VOXFIX_LEXICON") {
            if !lexicon.is_empty() {
                self.lexicon.path = PathBuf::from(lexicon);
            }
        }

        if let Ok(workers) = std::env::var("VOXFIX_WORKERS") {
            if let Ok(n) = workers.trim().parse::<usize>() {
                if n > 0 {
                    self.batch.workers = n;
                }
            }
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/voxfix/config.toml on Linux, or a relative
    /// `voxfix/config.toml` when no config directory can be determined.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voxfix")
            .join("config.toml")
    }

    /// Serialize to TOML for `voxfix config show`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| VoxfixError::ConfigParse {
            message: e.to_string(),
        })
    }
}
