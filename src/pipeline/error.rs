//! Reporting of per-record problems in batch runs.

use crate::error::VoxfixError;
use std::sync::Mutex;

/// Receives records that were dropped instead of corrected.
pub trait RecordReporter: Send + Sync {
    /// `line` is the 1-based input line of the record.
    fn report(&self, line: usize, error: &VoxfixError);
}

/// Reports through `tracing` at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl RecordReporter for LogReporter {
    fn report(&self, line: usize, error: &VoxfixError) {
        tracing::warn!(line, error = %error, "record dropped");
    }
}

/// Keeps every report in memory, for tests and summaries.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    reports: Mutex<Vec<(usize, String)>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(line, message)` pairs in report order.
    pub fn reports(&self) -> Vec<(usize, String)> {
        self.reports
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl RecordReporter for CollectingReporter {
    fn report(&self, line: usize, error: &VoxfixError) {
        let mut reports = self
            .reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        reports.push((line, error.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_reporter() {
        let reporter = LogReporter;
        // Just ensure it doesn't panic
        reporter.report(3, &VoxfixError::NoCandidates);
    }

    #[test]
    fn test_collecting_reporter_keeps_order() {
        let reporter = CollectingReporter::new();
        reporter.report(
            2,
            &VoxfixError::MalformedRecord {
                line: 2,
                message: "missing field `text`".to_string(),
            },
        );
        reporter.report(
            5,
            &VoxfixError::Inference {
                message: "boom".to_string(),
            },
        );

        let reports = reporter.reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].0, 2);
        assert!(reports[0].1.contains("missing field"));
        assert_eq!(reports[1], (5, "Masked-LM inference failed: boom".to_string()));
    }

    #[test]
    fn test_reporters_are_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn RecordReporter>();
    }
}
