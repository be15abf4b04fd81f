//! JSONL reading operations.
//!
//! This module provides buffered, line-numbered reading of JSONL tables.
//! Blank lines are ignored; every other line must hold one JSON value.
//!
//! Two loading styles are offered:
//!
//! - strict ([`JsonlReader::read_record`]): the first bad line is an error
//! - resilient ([`JsonlReader::read_resilient`]): bad lines become
//!   [`Warning`]s and loading continues

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::warning::{Warning, WarningCollector};

/// A decoded record together with the line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Row<T> {
    /// The 1-based line number of the record.
    pub line_number: usize,
    /// The decoded record.
    pub record: T,
}

/// Reader for JSONL (JSON Lines) data.
///
/// `JsonlReader` wraps a buffered reader and tracks line numbers so that
/// decode failures can be reported against the line that caused them.
///
/// # Examples
///
/// ```
/// use supplymap_tables::JsonlReader;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Meta { key: String }
///
/// let data = "{\"key\":\"a\"}\n\n{\"key\":\"b\"}\n";
/// let mut reader = JsonlReader::new(data.as_bytes());
///
/// let first: Meta = reader.read_record().unwrap().unwrap();
/// assert_eq!(first.key, "a");
/// let second: Meta = reader.read_record().unwrap().unwrap();
/// assert_eq!(second.key, "b");
/// assert_eq!(reader.line_number(), 3);
/// ```
pub struct JsonlReader<R> {
    reader: R,
    /// Current line number (1-based, 0 before any lines are read).
    line_number: usize,
    buffer: String,
}

impl<R: Read> JsonlReader<BufReader<R>> {
    /// Creates a new `JsonlReader` wrapping the given reader in a [`BufReader`].
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self::from_buf_read(BufReader::new(reader))
    }

    /// Creates a new `JsonlReader` with a custom buffer capacity.
    #[must_use]
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self::from_buf_read(BufReader::with_capacity(capacity, reader))
    }
}

impl JsonlReader<BufReader<File>> {
    /// Opens the file at `path` for reading.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(file))
    }
}

impl<R: BufRead> JsonlReader<R> {
    /// Creates a `JsonlReader` over an already-buffered reader.
    #[must_use]
    pub fn from_buf_read(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buffer: String::new(),
        }
    }

    /// Returns the line number of the last line read (0 before any reads).
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads the next non-blank line, returning its line number and trimmed text.
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the underlying reader fails, including when a
    /// line is not valid UTF-8.
    pub fn next_line(&mut self) -> Result<Option<(usize, &str)>> {
        loop {
            self.buffer.clear();
            if self.reader.read_line(&mut self.buffer)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            if !self.buffer.trim().is_empty() {
                return Ok(Some((self.line_number, self.buffer.trim())));
            }
        }
    }

    /// Reads and decodes the next record, failing on the first bad line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] with the offending line number if the line is
    /// not valid JSON for `T`, or [`Error::Io`] on read failure.
    pub fn read_record<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        match self.next_line()? {
            None => Ok(None),
            Some((line_number, text)) => serde_json::from_str(text)
                .map(Some)
                .map_err(|source| Error::Parse {
                    line_number,
                    source,
                }),
        }
    }

    /// Reads every remaining record, skipping lines that fail to decode.
    ///
    /// Lines that are not valid JSON are reported as
    /// [`Warning::MalformedJson`]. Lines that are valid JSON but do not match
    /// the shape of `T` are reported as [`Warning::SkippedLine`].
    ///
    /// # Errors
    ///
    /// Only I/O failures are fatal; decode failures never are.
    pub fn read_resilient<T: DeserializeOwned>(
        &mut self,
        warnings: &mut WarningCollector,
    ) -> Result<Vec<Row<T>>> {
        let mut rows = Vec::new();

        while let Some((line_number, text)) = self.next_line()? {
            let value: serde_json::Value = match serde_json::from_str(text) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(line_number, error = %e, "Skipping malformed JSONL line");
                    warnings.add(Warning::MalformedJson {
                        line_number,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            match serde_json::from_value(value) {
                Ok(record) => rows.push(Row {
                    line_number,
                    record,
                }),
                Err(e) => {
                    tracing::warn!(line_number, error = %e, "Skipping JSONL line with unexpected shape");
                    warnings.add(Warning::SkippedLine {
                        line_number,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(rows)
    }

    /// Consumes the reader, returning the underlying buffered reader.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Reads a JSONL file resiliently, returning the decoded rows and any warnings.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read.
pub fn read_jsonl_resilient<T, P>(path: P) -> Result<(Vec<Row<T>>, Vec<Warning>)>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let mut reader = JsonlReader::open(path)?;
    let mut warnings = WarningCollector::new();
    let rows = reader.read_resilient(&mut warnings)?;
    Ok((rows, warnings.into_warnings()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Entry {
        key: String,
        value: i64,
    }

    #[test]
    fn new_reader_starts_at_line_zero() {
        let reader = JsonlReader::new(&b""[..]);
        assert_eq!(reader.line_number(), 0);
    }

    #[test]
    fn next_line_skips_blank_lines_but_counts_them() {
        let mut reader = JsonlReader::new(&b"\n   \n{\"a\":1}\n"[..]);
        let (line, text) = reader.next_line().unwrap().unwrap();
        assert_eq!(line, 3);
        assert_eq!(text, "{\"a\":1}");
        assert!(reader.next_line().unwrap().is_none());
    }

    #[test]
    fn read_record_reports_line_number_on_failure() {
        let data = "{\"key\":\"a\",\"value\":1}\n{not json}\n";
        let mut reader = JsonlReader::new(data.as_bytes());

        let first: Entry = reader.read_record().unwrap().unwrap();
        assert_eq!(first.value, 1);

        let err = reader.read_record::<Entry>().unwrap_err();
        match err {
            Error::Parse { line_number, .. } => assert_eq!(line_number, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn read_resilient_separates_malformed_and_mismatched_lines() {
        let data = concat!(
            "{\"key\":\"a\",\"value\":1}\n",
            "{broken\n",
            "{\"key\":\"b\"}\n",
            "{\"key\":\"c\",\"value\":3}\n",
        );
        let mut reader = JsonlReader::new(data.as_bytes());
        let mut warnings = WarningCollector::new();

        let rows: Vec<Row<Entry>> = reader.read_resilient(&mut warnings).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line_number, 1);
        assert_eq!(rows[1].line_number, 4);
        assert_eq!(rows[1].record.key, "c");

        let warnings = warnings.into_warnings();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].kind(), "malformed_json");
        assert_eq!(warnings[0].line_number(), 2);
        assert_eq!(warnings[1].kind(), "skipped_line");
        assert_eq!(warnings[1].line_number(), 3);
    }
}
