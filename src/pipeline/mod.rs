//! Utterance processing: single-text correction, JSONL batches and latency
//! measurement.
//!
//! Batch runs fan records out to worker threads over a bounded crossbeam
//! channel and reassemble the results in input order.

pub mod batch;
pub mod error;
pub mod latency;
pub mod post_processor;

pub use batch::{BatchOptions, BatchReport, Record, run_file};
pub use error::{CollectingReporter, LogReporter, RecordReporter};
pub use latency::{LatencyStats, LatencyTracker};
pub use post_processor::{PostProcessor, finalize_punctuation};
