//! Option input: inline comma lists and two-column option files.

pub mod csv;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::selection::{OptionSet, SelectionError};

/// Errors reading an option file.
#[derive(Debug, Error)]
pub enum FileError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A record is not valid delimited text or is not `option,weight`.
    #[error("line {line}: {reason}")]
    MalformedRecord {
        /// Line the record starts on (1-based).
        line: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// A well-formed record holds an invalid option.
    #[error("line {line}: {source}")]
    InvalidEntry {
        /// Line the record starts on (1-based).
        line: usize,
        /// The selection error for this entry.
        #[source]
        source: SelectionError,
    },

    /// The file defines no usable options at all.
    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// Result type for option file operations.
pub type FileResult<T> = std::result::Result<T, FileError>;

/// Splits a comma-separated flag value.
///
/// An empty value yields no items, so an unset weight flag means "no
/// weights". Items are not trimmed.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(str::to_string).collect()
}

/// Parses option file text into an [`OptionSet`].
///
/// Each record must be `option,weight`. Errors name the line of the
/// offending record.
///
/// # Errors
///
/// Fails on malformed records, invalid entries or a file without records.
pub fn parse_option_file(text: &str) -> FileResult<OptionSet> {
    let records = csv::parse_records(text)?;
    for record in &records {
        if record.fields.len() != 2 {
            return Err(FileError::MalformedRecord {
                line: record.line,
                reason: format!(
                    "expected 2 fields (option,weight), found {}",
                    record.fields.len()
                ),
            });
        }
    }

    let pairs = records
        .iter()
        .map(|record| (record.fields[0].as_str(), record.fields[1].as_str()));
    OptionSet::from_pairs(pairs).map_err(|err| match err.index() {
        Some(index) => FileError::InvalidEntry {
            line: records[index].line,
            source: err,
        },
        None => FileError::Selection(err),
    })
}

/// Reads and parses an option file.
///
/// # Errors
///
/// Fails if the file cannot be read or [`parse_option_file`] fails.
pub fn read_option_file(path: &Path) -> FileResult<OptionSet> {
    let text = std::fs::read_to_string(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = text.len(), "read option file");
    parse_option_file(&text)
}
