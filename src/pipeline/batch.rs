//! Line-delimited JSON batch correction.
//!
//! Input lines are `{"id": <any>, "text": "<transcript>"}`; output lines carry
//! the same id with the corrected text, in input order. Malformed lines are
//! reported and dropped without stopping the run.

use crate::config::ErrorPolicy;
use crate::defaults;
use crate::error::{Result, VoxfixError};
use crate::pipeline::error::RecordReporter;
use crate::pipeline::post_processor::PostProcessor;
use crossbeam_channel::{bounded, unbounded};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// One utterance. `id` is carried through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: serde_json::Value,
    pub text: String,
    /// 1-based input line; not serialized.
    #[serde(skip)]
    pub line: usize,
}

impl Record {
    pub fn new(id: impl Into<serde_json::Value>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            line: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub workers: usize,
    pub on_error: ErrorPolicy,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            workers: defaults::WORKERS,
            on_error: ErrorPolicy::Abort,
        }
    }
}

/// Counts from one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Records corrected and written.
    pub processed: usize,
    /// Input lines dropped as malformed.
    pub malformed: usize,
    /// Records dropped because correction failed (skip policy only).
    pub failed: usize,
}

/// Parse JSONL records. Blank lines are skipped; malformed lines go to
/// `reporter`. Only I/O errors are returned.
pub fn read_records<R: BufRead>(
    reader: R,
    reporter: &dyn RecordReporter,
) -> Result<(Vec<Record>, usize)> {
    let mut records = Vec::new();
    let mut malformed = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Record>(&line) {
            Ok(mut record) => {
                record.line = line_no;
                records.push(record);
            }
            Err(e) => {
                malformed += 1;
                reporter.report(
                    line_no,
                    &VoxfixError::MalformedRecord {
                        line: line_no,
                        message: e.to_string(),
                    },
                );
            }
        }
    }
    Ok((records, malformed))
}

/// Write one JSON object per line. Non-ASCII text is written as-is.
pub fn write_records<W: Write>(mut writer: W, records: &[Record]) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Correct every record, preserving order.
///
/// Returns the corrected records and the number dropped under
/// [`ErrorPolicy::Skip`]. Under [`ErrorPolicy::Abort`] the first failure in
/// input order is returned; errors that are not per-record abort either way.
pub fn correct_records(
    processor: &PostProcessor,
    records: &[Record],
    options: &BatchOptions,
    reporter: &dyn RecordReporter,
) -> Result<(Vec<Record>, usize)> {
    let abort = options.on_error == ErrorPolicy::Abort;
    let results = if options.workers <= 1 || records.len() <= 1 {
        process_sequential(processor, records, abort)
    } else {
        process_parallel(processor, records, options.workers, abort)
    };

    let mut corrected = Vec::with_capacity(records.len());
    let mut failed = 0;
    for (record, result) in records.iter().zip(results) {
        match result {
            Some(Ok(text)) => corrected.push(Record {
                id: record.id.clone(),
                text,
                line: record.line,
            }),
            Some(Err(e)) if abort || !e.is_per_record() => return Err(e),
            Some(Err(e)) => {
                failed += 1;
                reporter.report(record.line, &e);
            }
            // Not reached: cancelled only after a failure that aborts the run.
            None => {}
        }
    }
    Ok((corrected, failed))
}

fn process_sequential(
    processor: &PostProcessor,
    records: &[Record],
    abort: bool,
) -> Vec<Option<Result<String>>> {
    let mut results = Vec::with_capacity(records.len());
    for record in records {
        let result = processor.process_one(&record.text);
        let stop = abort && result.is_err();
        results.push(Some(result));
        if stop {
            break;
        }
    }
    results.resize_with(records.len(), || None);
    results
}

fn process_parallel(
    processor: &PostProcessor,
    records: &[Record],
    workers: usize,
    abort: bool,
) -> Vec<Option<Result<String>>> {
    let (job_tx, job_rx) = bounded::<(usize, &str)>(workers * 2);
    let (result_tx, result_rx) = unbounded::<(usize, Result<String>)>();
    let cancelled = AtomicBool::new(false);

    thread::scope(|scope| {
        for worker in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let processor = processor.clone();
            let cancelled = &cancelled;
            scope.spawn(move || {
                for (index, text) in job_rx.iter() {
                    if cancelled.load(Ordering::Relaxed) {
                        break;
                    }
                    let result = processor.process_one(text);
                    if abort && result.is_err() {
                        cancelled.store(true, Ordering::Relaxed);
                    }
                    if result_tx.send((index, result)).is_err() {
                        break;
                    }
                }
                tracing::debug!(worker, "batch worker finished");
            });
        }
        drop(job_rx);
        drop(result_tx);

        for (index, record) in records.iter().enumerate() {
            if cancelled.load(Ordering::Relaxed) || job_tx.send((index, record.text.as_str())).is_err() {
                break;
            }
        }
        drop(job_tx);

        let mut results: Vec<Option<Result<String>>> = Vec::with_capacity(records.len());
        results.resize_with(records.len(), || None);
        for (index, result) in result_rx.iter() {
            results[index] = Some(result);
        }
        results
    })
}

/// Read `input`, correct every record and write `output`.
pub fn run_file(
    processor: &PostProcessor,
    input: &Path,
    output: &Path,
    options: &BatchOptions,
    reporter: &dyn RecordReporter,
) -> Result<BatchReport> {
    let reader = BufReader::new(File::open(input)?);
    let (records, malformed) = read_records(reader, reporter)?;
    tracing::info!(
        input = %input.display(),
        records = records.len(),
        malformed,
        workers = options.workers,
        "batch loaded"
    );

    let (corrected, failed) = correct_records(processor, &records, options, reporter)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_records(BufWriter::new(File::create(output)?), &corrected)?;

    let report = BatchReport {
        processed: corrected.len(),
        malformed,
        failed,
    };
    tracing::info!(
        output = %output.display(),
        processed = report.processed,
        malformed = report.malformed,
        failed = report.failed,
        "batch written"
    );
    Ok(report)
}
