//! Default configuration constants for voxfix.
//!
//! Shared by the config layer, the rule transforms and the CLI so that every
//! entry point agrees on the same tuning values.

/// Minimum fuzzy-match score (0..=100) for replacing a token with a lexicon name.
pub const NAME_MATCH_THRESHOLD: f64 = 85.0;

/// Minimum fuzzy-match score (0..=100) for counting a name mention during evaluation.
pub const EVAL_NAME_THRESHOLD: f64 = 90.0;

/// Maximum number of candidates kept by the generator.
pub const MAX_CANDIDATES: usize = 3;

/// Minimum run of consecutive single-character tokens collapsed into one word.
///
/// "g m a i l" is five tokens; shorter runs are left alone so that ordinary
/// words like "a" or "I" survive.
pub const SPELLED_LETTER_RUN: usize = 5;

/// Maximum number of tokens scanned for one spoken digit run.
pub const DIGIT_WINDOW: usize = 8;

/// Default masked language model (HuggingFace repo id).
pub const DEFAULT_MODEL: &str = "google-bert/bert-base-uncased";

/// Default tokenized sequence length (boundary tokens included).
///
/// Transcript utterances in this domain rarely exceed 30 word pieces.
pub const MAX_LENGTH: usize = 64;

/// Smallest usable sequence length: one boundary token on each side plus one
/// interior position.
pub const MIN_MAX_LENGTH: usize = 3;

/// Default lexicon location, relative to the working directory.
pub const DEFAULT_LEXICON_PATH: &str = "data/names_lexicon.txt";

/// Default number of batch worker threads.
pub const WORKERS: usize = 1;

/// Number of utterances sampled by the latency benchmark.
pub const LATENCY_SAMPLE: usize = 50;

/// Default number of timed latency runs.
pub const LATENCY_RUNS: usize = 100;

/// Default number of untimed warmup runs.
pub const LATENCY_WARMUP: usize = 10;

/// Small constant guarding divisions in precision/recall computations.
pub const EPSILON: f64 = 1e-9;
