//! Corpus-level correction metrics.

use crate::defaults::EPSILON;
use crate::error::{Result, VoxfixError};
use crate::eval::extract::{
    SCORED_MARKS, extract_emails, extract_numbers, names_in_text, punctuation_marks,
};
use crate::lexicon::Lexicon;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Metrics for one predicted/gold pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtteranceMetrics {
    pub wer: f64,
    pub cer: f64,
    pub punctuation_f1: f64,
    pub email_accuracy: f64,
    pub number_accuracy: f64,
    pub name_f1: f64,
}

/// Mean of each metric over a corpus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorpusMetrics {
    pub count: usize,
    pub wer: f64,
    pub cer: f64,
    pub punctuation_f1: f64,
    pub email_accuracy: f64,
    pub number_accuracy: f64,
    pub name_f1: f64,
}

impl CorpusMetrics {
    /// `(label, value)` pairs in report order.
    pub fn entries(&self) -> [(&'static str, f64); 6] {
        [
            ("WER", self.wer),
            ("CER", self.cer),
            ("PunctuationF1", self.punctuation_f1),
            ("EmailAcc", self.email_accuracy),
            ("NumberAcc", self.number_accuracy),
            ("NameF1", self.name_f1),
        ]
    }
}

fn edit_rate(distance: usize, reference_len: usize, hypothesis_len: usize) -> f64 {
    if reference_len == 0 {
        return if hypothesis_len == 0 { 0.0 } else { 1.0 };
    }
    distance as f64 / reference_len as f64
}

/// Word error rate: word-level edit distance over reference word count.
pub fn word_error_rate(reference: &str, hypothesis: &str) -> f64 {
    let reference: Vec<&str> = reference.split_whitespace().collect();
    let hypothesis: Vec<&str> = hypothesis.split_whitespace().collect();
    let distance = strsim::generic_levenshtein(&reference, &hypothesis);
    edit_rate(distance, reference.len(), hypothesis.len())
}

/// Character error rate over whitespace-collapsed text (spaces count).
pub fn char_error_rate(reference: &str, hypothesis: &str) -> f64 {
    let reference = reference.split_whitespace().collect::<Vec<_>>().join(" ");
    let hypothesis = hypothesis.split_whitespace().collect::<Vec<_>>().join(" ");
    let distance = strsim::levenshtein(&reference, &hypothesis);
    edit_rate(
        distance,
        reference.chars().count(),
        hypothesis.chars().count(),
    )
}

/// F1 over `.`, `,` and `?` counts. Zero when neither side has any.
pub fn punctuation_f1(predicted: &str, gold: &str) -> f64 {
    let p = punctuation_marks(predicted);
    let g = punctuation_marks(gold);
    let count = |marks: &[char], mark: char| marks.iter().filter(|&&c| c == mark).count();

    let tp: usize = SCORED_MARKS
        .iter()
        .map(|&mark| count(&p, mark).min(count(&g, mark)))
        .sum();
    let fp = p.len() - tp;
    let fn_ = g.len() - tp;

    let precision = tp as f64 / ((tp + fp) as f64 + EPSILON);
    let recall = tp as f64 / ((tp + fn_) as f64 + EPSILON);
    2.0 * precision * recall / (precision + recall + EPSILON)
}

/// F1 between the lexicon names found in each text. Zero when neither
/// mentions a name.
pub fn name_f1(predicted: &str, gold: &str, lexicon: &Lexicon) -> f64 {
    let p = names_in_text(predicted, lexicon);
    let g = names_in_text(gold, lexicon);
    let tp = p.intersection(&g).count() as f64;
    let precision = tp / (p.len() as f64 + EPSILON);
    let recall = tp / (g.len() as f64 + EPSILON);
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall + EPSILON)
    } else {
        0.0
    }
}

/// All metrics for one pair.
pub fn score_pair(predicted: &str, gold: &str, lexicon: &Lexicon) -> UtteranceMetrics {
    let exact = |same: bool| if same { 1.0 } else { 0.0 };
    UtteranceMetrics {
        wer: word_error_rate(gold, predicted),
        cer: char_error_rate(gold, predicted),
        punctuation_f1: punctuation_f1(predicted, gold),
        email_accuracy: exact(extract_emails(predicted) == extract_emails(gold)),
        number_accuracy: exact(extract_numbers(predicted) == extract_numbers(gold)),
        name_f1: name_f1(predicted, gold, lexicon),
    }
}

/// Mean metrics over aligned predicted/gold texts.
pub fn evaluate<P, G>(predicted: &[P], gold: &[G], lexicon: &Lexicon) -> Result<CorpusMetrics>
where
    P: AsRef<str>,
    G: AsRef<str>,
{
    if predicted.len() != gold.len() {
        return Err(VoxfixError::EvalLengthMismatch {
            predicted: predicted.len(),
            gold: gold.len(),
        });
    }
    if predicted.is_empty() {
        return Err(VoxfixError::EmptyCorpus);
    }

    let pairs: Vec<UtteranceMetrics> = predicted
        .iter()
        .zip(gold)
        .map(|(p, g)| score_pair(p.as_ref(), g.as_ref(), lexicon))
        .collect();
    let n = pairs.len() as f64;
    let mean = |f: fn(&UtteranceMetrics) -> f64| pairs.iter().map(f).sum::<f64>() / n;

    Ok(CorpusMetrics {
        count: pairs.len(),
        wer: mean(|m| m.wer),
        cer: mean(|m| m.cer),
        punctuation_f1: mean(|m| m.punctuation_f1),
        email_accuracy: mean(|m| m.email_accuracy),
        number_accuracy: mean(|m| m.number_accuracy),
        name_f1: mean(|m| m.name_f1),
    })
}

#[derive(Deserialize)]
struct TextField {
    text: String,
}

/// The `text` field of every non-blank JSONL line. Unlike batch input, a
/// malformed line is an error: corpora must stay aligned.
pub fn read_texts(path: &Path) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut texts = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: TextField =
            serde_json::from_str(&line).map_err(|e| VoxfixError::MalformedRecord {
                line: index + 1,
                message: e.to_string(),
            })?;
        texts.push(record.text);
    }
    Ok(texts)
}

/// Evaluate a predictions file against a gold file.
pub fn evaluate_files(predicted: &Path, gold: &Path, lexicon: &Lexicon) -> Result<CorpusMetrics> {
    let predicted = read_texts(predicted)?;
    let gold = read_texts(gold)?;
    tracing::info!(records = gold.len(), names = lexicon.len(), "evaluating");
    evaluate(&predicted, &gold, lexicon)
}
