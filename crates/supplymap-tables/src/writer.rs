//! JSONL writing operations.
//!
//! Each record is serialized to a single line followed by a newline.

use std::io::{BufWriter, Write};

use serde::Serialize;

use crate::error::Result;

/// Buffered writer for JSONL (JSON Lines) data.
///
/// # Examples
///
/// ```
/// use supplymap_tables::JsonlWriter;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Meta<'a> { key: &'a str, value: &'a str }
///
/// let mut writer = JsonlWriter::new(Vec::new());
/// writer.write(&Meta { key: "source", value: "survey" }).unwrap();
/// let bytes = writer.into_inner().unwrap();
/// assert_eq!(bytes, b"{\"key\":\"source\",\"value\":\"survey\"}\n");
/// ```
pub struct JsonlWriter<W: Write> {
    writer: BufWriter<W>,
    records_written: usize,
}

impl<W: Write> JsonlWriter<W> {
    /// Creates a new `JsonlWriter` wrapping the given writer in a [`BufWriter`].
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            records_written: 0,
        }
    }

    /// Creates a new `JsonlWriter` with a custom buffer capacity.
    #[must_use]
    pub fn with_capacity(writer: W, capacity: usize) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, writer),
            records_written: 0,
        }
    }

    /// Number of records written so far.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Serializes one record as a single line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying write fails.
    pub fn write<T: Serialize>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, value)?;
        self.writer.write_all(b"\n")?;
        self.records_written += 1;
        Ok(())
    }

    /// Serializes every record from an iterator.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first serialization or write failure.
    pub fn write_all<T, I>(&mut self, values: I) -> Result<()>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.write(&value)?;
        }
        Ok(())
    }

    /// Flushes buffered output to the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying flush fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush fails.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::Error::Io(e.into_error()))
    }
}
