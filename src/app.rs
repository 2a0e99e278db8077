//! Command implementations behind the CLI.
//!
//! Wires config, lexicon and scoring backend into a [`PostProcessor`] and runs
//! the batch, evaluation and latency flows.

use crate::config::{Config, ErrorPolicy};
use crate::correction::backend::ScoringBackend;
use crate::error::{Result, VoxfixError};
use crate::eval::{CorpusMetrics, evaluate_files};
use crate::lexicon::Lexicon;
use crate::pipeline::batch::{BatchOptions, BatchReport, run_file};
use crate::pipeline::error::LogReporter;
use crate::pipeline::latency::{LatencyStats, measure};
use crate::pipeline::post_processor::PostProcessor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Load config from `custom_path`, or from the default location when present,
/// then apply environment overrides and validate.
pub fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = match custom_path {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&Config::default_path())?,
    };
    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Apply per-command overrides on top of the loaded config.
pub fn apply_overrides(
    mut config: Config,
    names: Option<PathBuf>,
    model: Option<String>,
    workers: Option<usize>,
    skip_errors: bool,
) -> Result<Config> {
    if let Some(names) = names {
        config.lexicon.path = names;
    }
    if let Some(model) = model {
        config.reranker.model = model;
    }
    if let Some(workers) = workers {
        config.batch.workers = workers;
    }
    if skip_errors {
        config.batch.on_error = ErrorPolicy::Skip;
    }
    config.validate()?;
    Ok(config)
}

/// Load the masked LM named by `model`.
#[cfg(feature = "mlm")]
pub fn load_backend(model: &str) -> Result<Arc<dyn ScoringBackend>> {
    let backend = crate::correction::candle_mlm::CandleMaskedLm::load(model)?;
    Ok(Arc::new(backend))
}

/// Without the `mlm` feature there is no masked LM to load.
#[cfg(not(feature = "mlm"))]
pub fn load_backend(model: &str) -> Result<Arc<dyn ScoringBackend>> {
    Err(VoxfixError::BackendUnavailable {
        message: format!("cannot load '{model}': voxfix was built without the `mlm` feature"),
    })
}

/// Lexicon + backend → post-processor.
pub fn build_post_processor(
    config: &Config,
    backend: Arc<dyn ScoringBackend>,
) -> Result<PostProcessor> {
    let lexicon = Arc::new(Lexicon::load(&config.lexicon.path)?);
    tracing::info!(
        names = lexicon.len(),
        backend = backend.name(),
        "post-processor ready"
    );
    PostProcessor::from_config(config, lexicon, backend)
}

/// `voxfix run`
pub fn run_batch(
    config: &Config,
    backend: Arc<dyn ScoringBackend>,
    input: &Path,
    output: &Path,
) -> Result<BatchReport> {
    let processor = build_post_processor(config, backend)?;
    let options = BatchOptions {
        workers: config.batch.workers,
        on_error: config.batch.on_error,
    };
    run_file(&processor, input, output, &options, &LogReporter)
}

/// `voxfix eval`
pub fn run_eval(config: &Config, pred: &Path, gold: &Path) -> Result<CorpusMetrics> {
    let lexicon = Lexicon::load(&config.lexicon.path)?;
    evaluate_files(pred, gold, &lexicon)
}

/// `voxfix latency`
pub fn run_latency(
    config: &Config,
    backend: Arc<dyn ScoringBackend>,
    input: &Path,
    runs: usize,
    warmup: usize,
) -> Result<LatencyStats> {
    let processor = build_post_processor(config, backend)?;
    let texts = crate::eval::metrics::read_texts(input)?;
    if texts.is_empty() {
        return Err(VoxfixError::EmptyCorpus);
    }
    measure(&processor, &texts, runs, warmup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correction::backend::MockBackend;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn config_with_lexicon(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.lexicon.path = write(dir, "names.txt", "Ansh\nPriya\n");
        config
    }

    #[test]
    fn test_load_config_from_custom_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "voxfix.toml", "[batch]\nworkers = 3\n");
        let config = load_config(Some(&path)).unwrap();
        assert!(config.batch.workers >= 1);
    }

    #[test]
    fn test_load_config_missing_custom_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(&dir.path().join("missing.toml")));
        assert!(matches!(
            result,
            Err(VoxfixError::ConfigFileNotFound { .. })
        ));
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let config = apply_overrides(
            Config::default(),
            Some(PathBuf::from("names.txt")),
            Some("local/model".to_string()),
            Some(8),
            true,
        )
        .unwrap();
        assert_eq!(config.lexicon.path, PathBuf::from("names.txt"));
        assert_eq!(config.reranker.model, "local/model");
        assert_eq!(config.batch.workers, 8);
        assert_eq!(config.batch.on_error, ErrorPolicy::Skip);
    }

    #[test]
    fn test_zero_workers_override_is_rejected() {
        let result = apply_overrides(Config::default(), None, None, Some(0), false);
        assert!(matches!(
            result,
            Err(VoxfixError::ConfigInvalidValue { .. })
        ));
    }

    #[cfg(not(feature = "mlm"))]
    #[test]
    fn test_backend_unavailable_without_mlm_feature() {
        assert!(matches!(
            load_backend("google-bert/bert-base-uncased"),
            Err(VoxfixError::BackendUnavailable { .. })
        ));
    }

    #[test]
    fn test_missing_lexicon_is_reported() {
        let mut config = Config::default();
        config.lexicon.path = PathBuf::from("/nonexistent/names.txt");
        let result = build_post_processor(&config, Arc::new(MockBackend::new()));
        assert!(matches!(result, Err(VoxfixError::LexiconNotFound { .. })));
    }

    #[test]
    fn test_run_batch_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_lexicon(&dir);
        let input = write(
            &dir,
            "in.jsonl",
            "{\"id\": 1, \"text\": \"please pay rs 123456\"}\n",
        );
        let output = dir.path().join("out.jsonl");

        let report = run_batch(&config, Arc::new(MockBackend::new()), &input, &output).unwrap();
        assert_eq!(report.processed, 1);
        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("{\"id\":1,\"text\":"));
    }

    #[test]
    fn test_run_eval_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_lexicon(&dir);
        let pred = write(&dir, "pred.jsonl", "{\"id\":1,\"text\":\"Hey Ansh.\"}\n");
        let gold = write(&dir, "gold.jsonl", "{\"id\":1,\"text\":\"Hey Ansh.\"}\n");
        let metrics = run_eval(&config, &pred, &gold).unwrap();
        assert_eq!(metrics.wer, 0.0);
        assert!((metrics.name_f1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_run_latency_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_lexicon(&dir);
        let input = write(&dir, "in.jsonl", "{\"id\":1,\"text\":\"hello\"}\n");
        let stats = run_latency(&config, Arc::new(MockBackend::new()), &input, 3, 1).unwrap();
        assert_eq!(stats.count, 3);
    }
}
