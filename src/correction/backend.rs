//! Scoring backend boundary: tokenizer + masked language model.
//!
//! The reranker only sees token ids and logits. Real inference lives behind
//! [`ScoringBackend`] (see `candle_mlm` with the `mlm` feature); tests use
//! [`MockBackend`].

use crate::error::{Result, VoxfixError};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One tokenized text, padded or truncated to a fixed length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    pub ids: Vec<u32>,
    pub attention_mask: Vec<u32>,
}

impl Encoding {
    /// Number of attended (non-padding) tokens.
    pub fn attended_len(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m != 0).count()
    }
}

/// Row-major `rows × seq_len` token ids and attention mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBatch {
    pub rows: usize,
    pub seq_len: usize,
    pub input_ids: Vec<u32>,
    pub attention_mask: Vec<u32>,
}

impl TokenBatch {
    pub fn row_ids(&self, row: usize) -> &[u32] {
        &self.input_ids[row * self.seq_len..(row + 1) * self.seq_len]
    }
}

/// One row per interior position of an encoding, that position masked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedBatch {
    pub tokens: TokenBatch,
    /// Masked position of each row.
    pub positions: Vec<usize>,
    /// Token id that was replaced in each row.
    pub original_ids: Vec<u32>,
}

impl MaskedBatch {
    /// Mask each interior position `1..=L-2` of `encoding` in its own row,
    /// where `L` is the attended length.
    ///
    /// Returns `None` when there is no interior position.
    pub fn build(encoding: &Encoding, mask_token_id: u32) -> Option<Self> {
        let attended = encoding.attended_len().min(encoding.ids.len());
        if attended < 3 {
            return None;
        }

        let positions: Vec<usize> = (1..attended - 1).collect();
        let seq_len = encoding.ids.len();
        let mut input_ids = Vec::with_capacity(positions.len() * seq_len);
        let mut attention_mask = Vec::with_capacity(positions.len() * seq_len);
        let mut original_ids = Vec::with_capacity(positions.len());

        for &pos in &positions {
            let mut row = encoding.ids.clone();
            original_ids.push(row[pos]);
            row[pos] = mask_token_id;
            input_ids.extend(row);
            attention_mask.extend_from_slice(&encoding.attention_mask);
        }

        Some(Self {
            tokens: TokenBatch {
                rows: positions.len(),
                seq_len,
                input_ids,
                attention_mask,
            },
            positions,
            original_ids,
        })
    }

    pub fn rows(&self) -> usize {
        self.tokens.rows
    }
}

/// Dense `rows × seq_len × vocab` logits.
#[derive(Debug, Clone, PartialEq)]
pub struct Logits {
    rows: usize,
    seq_len: usize,
    vocab: usize,
    data: Vec<f32>,
}

impl Logits {
    pub fn new(rows: usize, seq_len: usize, vocab: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != rows * seq_len * vocab {
            return Err(VoxfixError::Inference {
                message: format!(
                    "logits buffer has {} values, expected {rows}x{seq_len}x{vocab}",
                    data.len()
                ),
            });
        }
        Ok(Self {
            rows,
            seq_len,
            vocab,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn vocab(&self) -> usize {
        self.vocab
    }

    /// Vocabulary distribution at `(row, pos)`.
    pub fn at(&self, row: usize, pos: usize) -> Result<&[f32]> {
        if row >= self.rows || pos >= self.seq_len {
            return Err(VoxfixError::Inference {
                message: format!(
                    "logits index ({row}, {pos}) out of range for {}x{}",
                    self.rows, self.seq_len
                ),
            });
        }
        let start = (row * self.seq_len + pos) * self.vocab;
        Ok(&self.data[start..start + self.vocab])
    }
}

/// Tokenizer + masked LM forward pass.
///
/// Implementations are shared read-only between batch workers, hence
/// `Send + Sync` and `&self` everywhere.
pub trait ScoringBackend: Send + Sync {
    /// Tokenize `text` with boundary tokens, padded/truncated to `max_length`.
    fn tokenize(&self, text: &str, max_length: usize) -> Result<Encoding>;

    /// Full forward pass over a batch.
    fn forward(&self, batch: &TokenBatch) -> Result<Logits>;

    fn mask_token_id(&self) -> u32;

    /// Name for logging.
    fn name(&self) -> &str;

    /// Logits at each row's masked position.
    ///
    /// The default runs [`forward`](Self::forward) and gathers; backends that
    /// can avoid materializing the full tensor should override it.
    fn masked_logits(&self, batch: &MaskedBatch) -> Result<Vec<Vec<f32>>> {
        let logits = self.forward(&batch.tokens)?;
        batch
            .positions
            .iter()
            .enumerate()
            .map(|(row, &pos)| logits.at(row, pos).map(<[f32]>::to_vec))
            .collect()
    }
}

/// Share one loaded model between workers.
impl<T: ScoringBackend + ?Sized> ScoringBackend for Arc<T> {
    fn tokenize(&self, text: &str, max_length: usize) -> Result<Encoding> {
        (**self).tokenize(text, max_length)
    }

    fn forward(&self, batch: &TokenBatch) -> Result<Logits> {
        (**self).forward(batch)
    }

    fn mask_token_id(&self) -> u32 {
        (**self).mask_token_id()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn masked_logits(&self, batch: &MaskedBatch) -> Result<Vec<Vec<f32>>> {
        (**self).masked_logits(batch)
    }
}

/// Deterministic in-process backend for tests and benchmarks.
///
/// Tokenizes on whitespace (lowercased) against a fixed word list; unknown
/// words map to `[UNK]`. Logits are flat except for "preferred" words, which
/// get a constant boost, so texts made of preferred words score higher and
/// shorter texts score higher than longer ones.
#[derive(Debug)]
pub struct MockBackend {
    vocabulary: HashMap<String, u32>,
    preferred: Vec<u32>,
    boost: f32,
    should_fail: bool,
    non_finite: bool,
    tokenize_calls: AtomicUsize,
    forward_calls: AtomicUsize,
}

impl MockBackend {
    pub const PAD: u32 = 0;
    pub const CLS: u32 = 1;
    pub const SEP: u32 = 2;
    pub const MASK: u32 = 3;
    pub const UNK: u32 = 4;
    const FIRST_WORD_ID: u32 = 5;

    /// Empty vocabulary: every word is `[UNK]`.
    pub fn new() -> Self {
        Self {
            vocabulary: HashMap::new(),
            preferred: Vec::new(),
            boost: 4.0,
            should_fail: false,
            non_finite: false,
            tokenize_calls: AtomicUsize::new(0),
            forward_calls: AtomicUsize::new(0),
        }
    }

    /// Assign ids to `words` in order.
    pub fn with_vocabulary(mut self, words: &[&str]) -> Self {
        for word in words {
            let next = Self::FIRST_WORD_ID + self.vocabulary.len() as u32;
            self.vocabulary.entry(word.to_lowercase()).or_insert(next);
        }
        self
    }

    /// Boost the logits of these words (added to the vocabulary if missing).
    pub fn with_preferred(mut self, words: &[&str]) -> Self {
        self = self.with_vocabulary(words);
        for word in words {
            if let Some(&id) = self.vocabulary.get(&word.to_lowercase()) {
                self.preferred.push(id);
            }
        }
        self
    }

    /// Fail every forward pass with an inference error.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Emit NaN logits.
    pub fn with_non_finite_logits(mut self) -> Self {
        self.non_finite = true;
        self
    }

    pub fn tokenize_calls(&self) -> usize {
        self.tokenize_calls.load(Ordering::SeqCst)
    }

    pub fn forward_calls(&self) -> usize {
        self.forward_calls.load(Ordering::SeqCst)
    }

    pub fn vocab_size(&self) -> usize {
        Self::FIRST_WORD_ID as usize + self.vocabulary.len()
    }

    pub fn token_id(&self, word: &str) -> u32 {
        self.vocabulary
            .get(&word.to_lowercase())
            .copied()
            .unwrap_or(Self::UNK)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringBackend for MockBackend {
    fn tokenize(&self, text: &str, max_length: usize) -> Result<Encoding> {
        self.tokenize_calls.fetch_add(1, Ordering::SeqCst);
        if max_length < 2 {
            return Err(VoxfixError::Tokenization {
                message: format!("max_length {max_length} leaves no room for boundary tokens"),
            });
        }

        let mut ids = vec![Self::CLS];
        ids.extend(
            text.split_whitespace()
                .take(max_length - 2)
                .map(|w| self.token_id(w)),
        );
        ids.push(Self::SEP);

        let mut attention_mask = vec![1; ids.len()];
        ids.resize(max_length, Self::PAD);
        attention_mask.resize(max_length, 0);
        Ok(Encoding {
            ids,
            attention_mask,
        })
    }

    fn forward(&self, batch: &TokenBatch) -> Result<Logits> {
        self.forward_calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(VoxfixError::Inference {
                message: "mock inference failure".to_string(),
            });
        }

        let vocab = self.vocab_size();
        let mut row = vec![0.0f32; vocab];
        for &id in &self.preferred {
            row[id as usize] = self.boost;
        }
        if self.non_finite {
            row.fill(f32::NAN);
        }

        let positions = batch.rows * batch.seq_len;
        let mut data = Vec::with_capacity(positions * vocab);
        for _ in 0..positions {
            data.extend_from_slice(&row);
        }
        Logits::new(batch.rows, batch.seq_len, vocab, data)
    }

    fn mask_token_id(&self) -> u32 {
        Self::MASK
    }

    fn name(&self) -> &str {
        "mock"
    }
}
