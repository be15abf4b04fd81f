//! JSON Lines table I/O for supplymap datasets.
//!
//! Every dataset table (nodes, matrix, metadata, user edges) is stored as
//! one JSON object per line. This crate provides:
//!
//! - [`JsonlReader`]: line-numbered reading, strict or resilient
//! - [`JsonlWriter`]: buffered writing of one record per line
//! - [`write_file_atomic`] / [`write_jsonl_atomic`]: temp-file-then-rename writes
//! - [`warning`]: non-fatal problems collected during resilient loading

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod atomic;
pub mod error;
pub mod reader;
pub mod warning;
pub mod writer;

pub use atomic::{write_file_atomic, write_jsonl_atomic};
pub use error::{Error, Result};
pub use reader::{read_jsonl_resilient, JsonlReader, Row};
pub use warning::{Warning, WarningCollector};
pub use writer::JsonlWriter;
