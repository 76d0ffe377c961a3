//! JSON document I/O for package files.

use anyhow::{Context, Result};
use serde_json::Value;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::PackageError;
use crate::runtime::Runtime;

const BOM: char = '\u{feff}';

/// Read and parse a JSON document, tolerating a leading byte-order mark.
#[tracing::instrument(skip(runtime))]
pub fn read_json<R: Runtime>(runtime: &R, path: &Path) -> Result<Value> {
    let text = runtime.read_to_string(path)?;
    let text = text.strip_prefix(BOM).unwrap_or(&text);
    let value = serde_json::from_str(text)
        .map_err(|e| PackageError::malformed(path, e.to_string()))?;
    Ok(value)
}

/// Serialize `value` with 2-space indentation.
pub fn to_pretty(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize JSON document")
}

/// Write `value` as pretty JSON, replacing the whole file.
///
/// The document is written to a sibling temp file first and then renamed over
/// the target, so a crash never leaves a half-written file behind.
#[tracing::instrument(skip(runtime, value))]
pub fn write_json<R: Runtime>(runtime: &R, path: &Path, value: &Value) -> Result<()> {
    let text = to_pretty(value)?;
    let tmp = temp_path(path);
    runtime.write(&tmp, text.as_bytes())?;
    runtime
        .rename(&tmp, path)
        .with_context(|| format!("Failed to replace {}", path.display()))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("document"));
    name.push(".tmp");
    path.with_file_name(name)
}
