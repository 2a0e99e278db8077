//! Error types for voxfix.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoxfixError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Scoring backend unavailable: {message}")]
    BackendUnavailable { message: String },

    #[error("Name lexicon not found at {path}")]
    LexiconNotFound { path: String },

    // Scoring backend runtime errors
    #[error("Tokenization failed: {message}")]
    Tokenization { message: String },

    #[error("Masked-LM inference failed: {message}")]
    Inference { message: String },

    #[error("No candidates to rerank")]
    NoCandidates,

    // Batch input errors
    #[error("Malformed record on line {line}: {message}")]
    MalformedRecord { line: usize, message: String },

    // Evaluation errors
    #[error("Predicted and gold corpora differ in length: {predicted} vs {gold}")]
    EvalLengthMismatch { predicted: usize, gold: usize },

    #[error("Cannot evaluate an empty corpus")]
    EmptyCorpus,

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VoxfixError {
    /// Whether this error belongs to a single record rather than the whole run.
    pub fn is_per_record(&self) -> bool {
        matches!(
            self,
            VoxfixError::MalformedRecord { .. }
                | VoxfixError::Tokenization { .. }
                | VoxfixError::Inference { .. }
        )
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, VoxfixError>;
