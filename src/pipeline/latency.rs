//! Latency measurement for `process_one`.

use crate::defaults::LATENCY_SAMPLE;
use crate::error::{Result, VoxfixError};
use crate::pipeline::post_processor::PostProcessor;
use std::time::{Duration, Instant};

/// Aggregated latency statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyStats {
    pub count: usize,
    pub p50: Duration,
    pub p95: Duration,
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
}

impl LatencyStats {
    /// `p50_ms=12.34 p95_ms=56.78 (runs=100)`
    pub fn summary_line(&self) -> String {
        format!(
            "p50_ms={} p95_ms={} (runs={})",
            format_millis(self.p50),
            format_millis(self.p95),
            self.count
        )
    }
}

/// Collects per-call durations.
#[derive(Debug, Default)]
pub struct LatencyTracker {
    measurements: Vec<Duration>,
}

impl LatencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, elapsed: Duration) {
        self.measurements.push(elapsed);
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Computes aggregated statistics, `None` when nothing was recorded.
    pub fn stats(&self) -> Option<LatencyStats> {
        let mut sorted = self.measurements.clone();
        sorted.sort_unstable();

        let &min = sorted.first()?;
        let &max = sorted.last()?;
        let sum: Duration = sorted.iter().sum();
        Some(LatencyStats {
            count: sorted.len(),
            p50: sorted[percentile_index(sorted.len(), 0.5)],
            p95: sorted[percentile_index(sorted.len(), 0.95)],
            min,
            max,
            mean: sum / sorted.len() as u32,
        })
    }
}

/// Index of the `q` quantile in a sorted sample of `n`: `floor(q * n) - 1`,
/// clamped to the valid range.
pub fn percentile_index(n: usize, q: f64) -> usize {
    if n == 0 {
        return 0;
    }
    let rank = (q * n as f64).floor() as usize;
    rank.saturating_sub(1).min(n - 1)
}

/// Milliseconds with two decimals.
pub fn format_millis(d: Duration) -> String {
    format!("{:.2}", d.as_secs_f64() * 1000.0)
}

/// Time `runs` calls to `process_one`.
///
/// Only the first [`LATENCY_SAMPLE`] texts are used, cycled in order. The
/// first text is also used for `warmup` untimed calls.
pub fn measure(
    processor: &PostProcessor,
    texts: &[String],
    runs: usize,
    warmup: usize,
) -> Result<LatencyStats> {
    let sample = &texts[..texts.len().min(LATENCY_SAMPLE)];
    let Some(first) = sample.first() else {
        return Err(VoxfixError::EmptyCorpus);
    };
    if runs == 0 {
        return Err(VoxfixError::ConfigInvalidValue {
            key: "runs".to_string(),
            message: "must be at least 1".to_string(),
        });
    }

    tracing::info!(warmup, runs, sample = sample.len(), "measuring latency");
    for _ in 0..warmup {
        processor.process_one(first)?;
    }

    let mut tracker = LatencyTracker::new();
    for text in sample.iter().cycle().take(runs) {
        let start = Instant::now();
        processor.process_one(text)?;
        tracker.record(start.elapsed());
    }

    tracker.stats().ok_or(VoxfixError::EmptyCorpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::correction::backend::{MockBackend, ScoringBackend};
    use crate::lexicon::Lexicon;
    use std::sync::Arc;

    #[test]
    fn test_latency_tracker_empty() {
        let tracker = LatencyTracker::new();
        assert!(tracker.is_empty());
        assert!(tracker.stats().is_none());
    }

    #[test]
    fn test_percentile_index() {
        assert_eq!(percentile_index(100, 0.5), 49);
        assert_eq!(percentile_index(100, 0.95), 94);
        assert_eq!(percentile_index(1, 0.5), 0);
        assert_eq!(percentile_index(1, 0.95), 0);
        assert_eq!(percentile_index(3, 0.5), 0);
        assert_eq!(percentile_index(10, 1.0), 9);
        assert_eq!(percentile_index(0, 0.5), 0);
    }

    #[test]
    fn test_latency_tracker_stats() {
        let mut tracker = LatencyTracker::new();
        for ms in (1..=20).rev() {
            tracker.record(Duration::from_millis(ms));
        }
        let stats = tracker.stats().unwrap();
        assert_eq!(stats.count, 20);
        assert_eq!(stats.min, Duration::from_millis(1));
        assert_eq!(stats.max, Duration::from_millis(20));
        // floor(0.5 * 20) - 1 = 9 → 10ms; floor(0.95 * 20) - 1 = 18 → 19ms
        assert_eq!(stats.p50, Duration::from_millis(10));
        assert_eq!(stats.p95, Duration::from_millis(19));
        assert_eq!(stats.mean, Duration::from_micros(10_500));
    }

    #[test]
    fn test_summary_line_format() {
        let mut tracker = LatencyTracker::new();
        tracker.record(Duration::from_micros(12_250));
        let stats = tracker.stats().unwrap();
        assert_eq!(stats.summary_line(), "p50_ms=12.25 p95_ms=12.25 (runs=1)");
    }

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(Duration::ZERO), "0.00");
        assert_eq!(format_millis(Duration::from_micros(1500)), "1.50");
    }

    #[test]
    fn test_measure_runs_warmup_and_timed_calls() {
        let backend = Arc::new(MockBackend::new());
        let shared: Arc<dyn ScoringBackend> = backend.clone();
        let pp = PostProcessor::from_config(
            &Config::default(),
            Arc::new(Lexicon::default()),
            shared,
        )
        .unwrap();
        // Two candidates per text, so every call reaches the backend.
        let texts = vec!["send it to my g mail dot com".to_string()];

        let stats = measure(&pp, &texts, 5, 2).unwrap();
        assert_eq!(stats.count, 5);
        assert!(stats.p50 <= stats.p95);
        // 2 warmup + 5 timed calls, one forward pass per scored candidate.
        assert_eq!(backend.forward_calls(), 14);
    }

    #[test]
    fn test_measure_rejects_empty_input() {
        let pp = PostProcessor::from_config(
            &Config::default(),
            Arc::new(Lexicon::default()),
            Arc::new(MockBackend::new()),
        )
        .unwrap();
        assert!(matches!(
            measure(&pp, &[], 10, 1),
            Err(VoxfixError::EmptyCorpus)
        ));
        assert!(measure(&pp, &["hi".to_string()], 0, 0).is_err());
    }
}
