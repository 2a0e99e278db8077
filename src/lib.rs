//! voxfix - post-ASR transcript correction
//!
//! Rule-based candidate rewrites reranked by masked-LM pseudo-likelihood.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod correction;
pub mod defaults;
pub mod error;
pub mod eval;
pub mod lexicon;
pub mod pipeline;
pub mod rules;

// Core traits
pub use correction::backend::{MockBackend, ScoringBackend};
pub use rules::Similarity;

// Correction
pub use correction::candidates::CandidateGenerator;
pub use correction::reranker::{CandidateScore, PseudoLikelihoodReranker};
pub use pipeline::post_processor::PostProcessor;

// Error handling
pub use error::{Result, VoxfixError};

// Config
pub use config::Config;
pub use lexicon::Lexicon;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
