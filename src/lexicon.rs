//! Ordered lexicon of known personal names.
//!
//! Loaded once per run and never mutated. Iteration order is file order, which
//! makes fuzzy-match tie-breaking deterministic: when two names score the same,
//! the one listed first wins.

use crate::error::{Result, VoxfixError};
use std::collections::HashSet;
use std::path::Path;

/// Immutable, ordered set of proper names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
    names: Vec<String>,
}

impl Lexicon {
    /// Build a lexicon from names in priority order.
    ///
    /// Entries are trimmed; blank entries and exact duplicates are dropped
    /// (first occurrence keeps its position).
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .filter_map(|n| {
                let n = n.as_ref().trim();
                if n.is_empty() || !seen.insert(n.to_string()) {
                    None
                } else {
                    Some(n.to_string())
                }
            })
            .collect();
        Self { names }
    }

    /// Parse a newline-delimited name list.
    pub fn parse(content: &str) -> Self {
        Self::from_names(content.lines())
    }

    /// Load a newline-delimited name list from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VoxfixError::LexiconNotFound {
                    path: path.display().to_string(),
                }
            } else {
                VoxfixError::Io(e)
            }
        })?;
        let lexicon = Self::parse(&content);
        tracing::info!(path = %path.display(), names = lexicon.len(), "lexicon loaded");
        Ok(lexicon)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_skips_blank_lines_and_trims() {
        let lexicon = Lexicon::parse("Ansh\n\n  Priya  \n\t\nRahul Verma\n");
        assert_eq!(lexicon.names(), &["Ansh", "Priya", "Rahul Verma"]);
    }

    #[test]
    fn test_parse_preserves_file_order() {
        let lexicon = Lexicon::parse("Zoya\nAarav\nMira\n");
        let names: Vec<&str> = lexicon.iter().collect();
        assert_eq!(names, vec!["Zoya", "Aarav", "Mira"]);
    }

    #[test]
    fn test_duplicates_keep_first_position() {
        let lexicon = Lexicon::from_names(["Ansh", "Mira", "Ansh", "Kabir"]);
        assert_eq!(lexicon.names(), &["Ansh", "Mira", "Kabir"]);
    }

    #[test]
    fn test_empty_input_gives_empty_lexicon() {
        let lexicon = Lexicon::parse("");
        assert!(lexicon.is_empty());
        assert_eq!(lexicon.len(), 0);
    }

    #[test]
    fn test_load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Ansh").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "Neha Sharma").unwrap();
        file.flush().unwrap();

        let lexicon = Lexicon::load(file.path()).unwrap();
        assert_eq!(lexicon.names(), &["Ansh", "Neha Sharma"]);
    }

    #[test]
    fn test_load_missing_file_is_lexicon_not_found() {
        let err = Lexicon::load(Path::new("/nonexistent/names.txt")).unwrap_err();
        assert!(matches!(err, VoxfixError::LexiconNotFound { .. }));
        assert!(err.to_string().contains("/nonexistent/names.txt"));
    }
}
