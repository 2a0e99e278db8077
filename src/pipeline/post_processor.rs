//! End-to-end correction of one utterance.

use crate::config::Config;
use crate::correction::backend::ScoringBackend;
use crate::correction::candidates::CandidateGenerator;
use crate::correction::reranker::PseudoLikelihoodReranker;
use crate::error::Result;
use crate::lexicon::Lexicon;
use crate::rules::RuleTables;
use crate::rules::names::similarity_for;
use std::sync::Arc;

/// Generator → reranker → final punctuation touch-up.
///
/// Holds no mutable state, so one instance can serve many utterances; batch
/// workers still get their own instance and share only the backend.
#[derive(Debug, Clone)]
pub struct PostProcessor {
    generator: CandidateGenerator,
    reranker: Arc<PseudoLikelihoodReranker>,
}

impl PostProcessor {
    pub fn new(generator: CandidateGenerator, reranker: PseudoLikelihoodReranker) -> Self {
        Self {
            generator,
            reranker: Arc::new(reranker),
        }
    }

    /// Build from configuration with an already-loaded lexicon and backend.
    pub fn from_config(
        config: &Config,
        lexicon: Arc<Lexicon>,
        backend: Arc<dyn ScoringBackend>,
    ) -> Result<Self> {
        let generator = CandidateGenerator::new(lexicon)
            .with_tables(Arc::new(RuleTables::english()))
            .with_similarity(Arc::from(similarity_for(config.rules.scorer)))
            .with_name_threshold(config.rules.name_threshold);
        let reranker = PseudoLikelihoodReranker::new(backend, config.reranker.max_length)?;
        Ok(Self::new(generator, reranker))
    }

    pub fn generator(&self) -> &CandidateGenerator {
        &self.generator
    }

    pub fn reranker(&self) -> &PseudoLikelihoodReranker {
        &self.reranker
    }

    /// Correct one raw transcript.
    pub fn process_one(&self, text: &str) -> Result<String> {
        let candidates = self.generator.generate(text);
        let best = self.reranker.choose_best(&candidates)?;
        Ok(finalize_punctuation(&best, self.generator.tables()))
    }
}

/// Make sure the chosen text ends in `?`, `.` or `,`.
///
/// Texts opening with a question word ("can", "is", "hey", ...) get `?`,
/// everything else `.`. Trailing whitespace is dropped before appending.
pub fn finalize_punctuation(text: &str, tables: &RuleTables) -> String {
    let lower = text.to_lowercase();
    let lower = lower.trim();
    if lower.ends_with(['?', '.', ',']) {
        return text.to_string();
    }

    let is_question = lower
        .split_whitespace()
        .next()
        .is_some_and(|first| tables.is_question_opener(first));
    let mark = if is_question { '?' } else { '.' };
    format!("{}{mark}", text.trim_end())
}
