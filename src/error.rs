//! Error kinds surfaced by package operations.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum PackageError {
    /// Document not parseable or its expected shape is absent
    #[error("malformed package document {path}: {reason}")]
    MalformedPackage { path: PathBuf, reason: String },

    #[error("stage '{label}' not found")]
    StageNotFound { label: String },

    #[error("index {index} out of range (1..{count})")]
    IndexOutOfRange { index: usize, count: usize },

    /// A machine name has no matching folder under `libraries/`
    #[error("library {machine_name} not installed in {libraries_dir}")]
    LibraryNotInstalled {
        machine_name: String,
        libraries_dir: PathBuf,
    },

    #[error("missing argument: {0}")]
    MissingArgument(String),
}

impl PackageError {
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PackageError::MalformedPackage {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
