use std::path::{Path, PathBuf};

/// Default package directory, relative to the working directory.
pub const DEFAULT_PACKAGE_DIR: &str = "h5p-folder";

/// Directory layout of an unpacked H5P package.
///
/// ```text
/// <root>/h5p.json
/// <root>/content/content.json
/// <root>/content/<asset dirs>/...
/// <root>/libraries/<MachineName>-<major>.<minor>/library.json
/// ```
///
/// Import sources share the same shape, so the same struct describes both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout {
    root: PathBuf,
}

impl PackageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns: `<root>/content`
    pub fn content_dir(&self) -> PathBuf {
        self.root.join("content")
    }

    /// Returns: `<root>/content/content.json`
    pub fn content_json(&self) -> PathBuf {
        self.content_dir().join("content.json")
    }

    /// Returns: `<root>/h5p.json`
    pub fn manifest_json(&self) -> PathBuf {
        self.root.join("h5p.json")
    }

    /// Returns: `<root>/libraries`
    pub fn libraries_dir(&self) -> PathBuf {
        self.root.join("libraries")
    }
}

impl Default for PackageLayout {
    fn default() -> Self {
        Self::new(DEFAULT_PACKAGE_DIR)
    }
}
