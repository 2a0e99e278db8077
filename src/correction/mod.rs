//! Candidate generation and masked-LM reranking.

pub mod backend;
#[cfg(feature = "mlm")]
pub mod candle_mlm;
pub mod candidates;
pub mod reranker;
