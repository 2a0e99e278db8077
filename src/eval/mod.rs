//! Evaluation of corrected transcripts against gold references.

pub mod extract;
pub mod metrics;

pub use metrics::{CorpusMetrics, UtteranceMetrics, evaluate, evaluate_files};
