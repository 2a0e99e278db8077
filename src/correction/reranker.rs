//! Pseudo-log-likelihood reranking.
//!
//! A candidate's score is the sum, over each interior token, of the
//! log-probability the masked LM assigns to the original token when that
//! position is masked. Higher is more fluent.

use crate::correction::backend::{MaskedBatch, ScoringBackend};
use crate::defaults::MIN_MAX_LENGTH;
use crate::error::{Result, VoxfixError};
use std::sync::Arc;

/// Outcome of scoring one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CandidateScore {
    /// Nothing to score (no interior tokens); counts as 0.0.
    Neutral,
    /// Sum of log-probabilities over interior tokens.
    Scored(f64),
}

impl CandidateScore {
    pub fn value(&self) -> f64 {
        match self {
            CandidateScore::Neutral => 0.0,
            CandidateScore::Scored(v) => *v,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub text: String,
    pub score: CandidateScore,
}

/// Log-probability of `index` under a softmax over `logits`.
///
/// Uses the max-shift form so large logits do not overflow.
pub fn log_prob_at(logits: &[f32], index: usize) -> Result<f64> {
    let Some(&target) = logits.get(index) else {
        return Err(VoxfixError::Inference {
            message: format!("token id {index} outside vocabulary of {}", logits.len()),
        });
    };
    if logits.iter().any(|v| !v.is_finite()) {
        return Err(VoxfixError::Inference {
            message: "non-finite logits".to_string(),
        });
    }

    let max = logits
        .iter()
        .map(|&v| f64::from(v))
        .fold(f64::NEG_INFINITY, f64::max);
    let sum: f64 = logits.iter().map(|&v| (f64::from(v) - max).exp()).sum();
    Ok(f64::from(target) - max - sum.ln())
}

/// Picks the candidate the masked LM finds most likely.
pub struct PseudoLikelihoodReranker {
    backend: Arc<dyn ScoringBackend>,
    max_length: usize,
}

impl PseudoLikelihoodReranker {
    pub fn new(backend: Arc<dyn ScoringBackend>, max_length: usize) -> Result<Self> {
        if max_length < MIN_MAX_LENGTH {
            return Err(VoxfixError::ConfigInvalidValue {
                key: "reranker.max_length".to_string(),
                message: format!("must be at least {MIN_MAX_LENGTH}, got {max_length}"),
            });
        }
        Ok(Self {
            backend,
            max_length,
        })
    }

    pub fn backend(&self) -> &Arc<dyn ScoringBackend> {
        &self.backend
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Pseudo-log-likelihood of one text.
    pub fn score(&self, text: &str) -> Result<CandidateScore> {
        let encoding = self.backend.tokenize(text, self.max_length)?;
        let Some(batch) = MaskedBatch::build(&encoding, self.backend.mask_token_id()) else {
            return Ok(CandidateScore::Neutral);
        };

        let rows = self.backend.masked_logits(&batch)?;
        if rows.len() != batch.rows() {
            return Err(VoxfixError::Inference {
                message: format!(
                    "backend returned {} rows for {} masked positions",
                    rows.len(),
                    batch.rows()
                ),
            });
        }

        let mut total = 0.0;
        for (row, &original) in rows.iter().zip(&batch.original_ids) {
            total += log_prob_at(row, original as usize)?;
        }
        Ok(CandidateScore::Scored(total))
    }

    /// Score every candidate, in order.
    pub fn score_all(&self, candidates: &[String]) -> Result<Vec<ScoredCandidate>> {
        candidates
            .iter()
            .map(|text| {
                let score = self.score(text)?;
                tracing::debug!(candidate = %text, score = score.value(), "scored");
                Ok(ScoredCandidate {
                    text: text.clone(),
                    score,
                })
            })
            .collect()
    }

    /// Highest-scoring candidate; the earliest wins ties.
    ///
    /// A single candidate is returned without consulting the backend.
    pub fn choose_best(&self, candidates: &[String]) -> Result<String> {
        match candidates {
            [] => Err(VoxfixError::NoCandidates),
            [only] => Ok(only.clone()),
            _ => {
                let scored = self.score_all(candidates)?;
                let mut best: Option<&ScoredCandidate> = None;
                for candidate in &scored {
                    if best.is_none_or(|b| candidate.score.value() > b.score.value()) {
                        best = Some(candidate);
                    }
                }
                best.map(|b| b.text.clone()).ok_or(VoxfixError::NoCandidates)
            }
        }
    }
}

impl std::fmt::Debug for PseudoLikelihoodReranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PseudoLikelihoodReranker")
            .field("backend", &self.backend.name())
            .field("max_length", &self.max_length)
            .finish()
    }
}
