//! Atomic file writes.
//!
//! Data is first written to a sibling file with a `.tmp` extension, flushed,
//! and then renamed over the target path. A failed write leaves any existing
//! target untouched; the temporary file is removed on a best-effort basis.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{JsonlWriter, Result};

/// Writes a file atomically using the caller-provided body writer.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created, if `body`
/// fails, or if the final rename fails.
///
/// # Examples
///
/// ```no_run
/// use std::io::Write;
/// use supplymap_tables::write_file_atomic;
///
/// write_file_atomic("EDGES.csv", |w| {
///     writeln!(w, "from,to,weight")?;
///     Ok(())
/// })?;
/// # Ok::<(), supplymap_tables::Error>(())
/// ```
pub fn write_file_atomic<P, F>(path: P, body: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let path = path.as_ref();
    let temp_path = make_temp_path(path);

    let write_result = (|| -> Result<()> {
        let mut writer = BufWriter::new(File::create(&temp_path)?);
        body(&mut writer)?;
        writer.flush()?;
        Ok(())
    })();

    if let Err(e) = write_result {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e);
    }

    std::fs::rename(&temp_path, path)?;
    tracing::debug!(path = %path.display(), "Wrote file atomically");
    Ok(())
}

/// Atomically writes an iterator of values to a JSONL file.
///
/// # Errors
///
/// See [`write_file_atomic`]; serialization failures are also returned.
pub fn write_jsonl_atomic<T, I, P>(path: P, values: I) -> Result<usize>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
    P: AsRef<Path>,
{
    let mut written = 0;
    write_file_atomic(path, |w| {
        let mut writer = JsonlWriter::new(w);
        writer.write_all(values)?;
        writer.flush()?;
        written = writer.records_written();
        Ok(())
    })?;
    Ok(written)
}

/// Builds the temporary path by appending `.tmp` to the file name.
fn make_temp_path(path: &Path) -> PathBuf {
    let mut temp_path = path.to_path_buf();
    let new_extension = match path.extension() {
        Some(ext) => {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".tmp");
            new_ext
        }
        None => std::ffi::OsString::from("tmp"),
    };
    temp_path.set_extension(new_extension);
    temp_path
}
