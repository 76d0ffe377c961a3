//! Package repository: loads, resolves and persists the package documents.

use anyhow::{Context, Result};
use log::debug;

use crate::error::PackageError;
use crate::runtime::Runtime;

use super::json::{read_json, write_json};
use super::{ContentDocument, InstalledLibrary, Manifest, PackageLayout, find_installed_library};

/// Access to one unpacked package on disk.
///
/// Provides a unified interface for:
/// - Loading `content.json` and `h5p.json`
/// - Resolving installed library versions
/// - Writing both documents back
pub struct PackageRepository<'a, R: Runtime> {
    runtime: &'a R,
    layout: PackageLayout,
}

impl<'a, R: Runtime> PackageRepository<'a, R> {
    pub fn new(runtime: &'a R, layout: PackageLayout) -> Self {
        Self { runtime, layout }
    }

    pub fn layout(&self) -> &PackageLayout {
        &self.layout
    }

    pub fn runtime(&self) -> &'a R {
        self.runtime
    }

    /// Load `content.json` and locate its stage array.
    #[tracing::instrument(skip(self))]
    pub fn load_content(&self) -> Result<ContentDocument> {
        let path = self.layout.content_json();
        if !self.runtime.exists(&path) {
            return Err(PackageError::malformed(&path, "file not found").into());
        }
        let document = read_json(self.runtime, &path)?;
        let content = ContentDocument::from_value(path, document)?;
        debug!(
            "Loaded {} stage(s) from {}",
            content.stage_count(),
            content.stages_pointer()
        );
        Ok(content)
    }

    /// Load `h5p.json`.
    #[tracing::instrument(skip(self))]
    pub fn load_manifest(&self) -> Result<Manifest> {
        let path = self.layout.manifest_json();
        if !self.runtime.exists(&path) {
            return Err(PackageError::malformed(&path, "file not found").into());
        }
        let document = read_json(self.runtime, &path)?;
        Ok(Manifest::from_value(path, document)?)
    }

    /// Look up the installed version of `machine_name`, if any.
    pub fn resolve_installed_library(&self, machine_name: &str) -> Result<Option<InstalledLibrary>> {
        find_installed_library(self.runtime, &self.layout.libraries_dir(), machine_name)
    }

    /// Like [`resolve_installed_library`](Self::resolve_installed_library) but
    /// fails with `LibraryNotInstalled` when absent.
    pub fn require_installed_library(&self, machine_name: &str) -> Result<InstalledLibrary> {
        self.resolve_installed_library(machine_name)?.ok_or_else(|| {
            PackageError::LibraryNotInstalled {
                machine_name: machine_name.to_string(),
                libraries_dir: self.layout.libraries_dir(),
            }
            .into()
        })
    }

    #[tracing::instrument(skip(self, content))]
    pub fn save_content(&self, content: &ContentDocument) -> Result<()> {
        write_json(self.runtime, content.path(), content.document())
            .with_context(|| format!("Failed to save {:?}", content.path()))
    }

    #[tracing::instrument(skip(self, manifest))]
    pub fn save_manifest(&self, manifest: &Manifest) -> Result<()> {
        write_json(self.runtime, manifest.path(), &manifest.to_value()?)
            .with_context(|| format!("Failed to save {:?}", manifest.path()))
    }

    /// Write content then manifest.
    ///
    /// A failure between the two writes leaves the content updated and the
    /// manifest stale; re-running the command (or `repair`) reconciles them.
    pub fn persist(&self, content: &ContentDocument, manifest: &Manifest) -> Result<()> {
        self.save_content(content)?;
        self.save_manifest(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use crate::test_utils::{write_fixture_package, write_library};
    use mockall::predicate::eq;
    use serde_json::Value;
    use std::path::PathBuf;

    #[test]
    fn test_load_content_missing_file() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_exists()
            .with(eq(PathBuf::from("/pkg/content/content.json")))
            .returning(|_| false);

        let repo = PackageRepository::new(&runtime, PackageLayout::new("/pkg"));
        let err = repo.load_content().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PackageError>(),
            Some(PackageError::MalformedPackage { .. })
        ));
    }

    #[test]
    fn test_load_manifest_with_bom() {
        let mut runtime = MockRuntime::new();
        let path = PathBuf::from("/pkg/h5p.json");
        runtime
            .expect_exists()
            .with(eq(path.clone()))
            .returning(|_| true);
        runtime
            .expect_read_to_string()
            .with(eq(path))
            .returning(|_| Ok("\u{feff}{\"mainLibrary\": \"H5P.GameMap\"}".into()));

        let repo = PackageRepository::new(&runtime, PackageLayout::new("/pkg"));
        let manifest = repo.load_manifest().unwrap();
        assert_eq!(manifest.main_library(), Some("H5P.GameMap"));
        assert!(manifest.dependencies.is_empty());
    }

    #[test]
    fn test_require_installed_library_not_installed() {
        let dir = tempfile::tempdir().unwrap();
        let layout = write_fixture_package(dir.path());
        let repo = PackageRepository::new(&RealRuntime, layout);

        let err = repo.require_installed_library("H5P.SpeakTheWordsSet").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PackageError>(),
            Some(PackageError::LibraryNotInstalled { .. })
        ));
    }

    #[test]
    fn test_resolve_installed_library_reads_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let layout = write_fixture_package(dir.path());
        write_library(&layout.libraries_dir(), "H5P.Blanks", 1, 14);
        let repo = PackageRepository::new(&RealRuntime, layout);

        let lib = repo.resolve_installed_library("H5P.Blanks").unwrap().unwrap();
        assert_eq!((lib.major, lib.minor), (1, 14));
        assert_eq!(lib.folder, "H5P.Blanks-1.14");
    }

    #[test]
    fn test_persist_round_trip_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let layout = write_fixture_package(dir.path());
        let original: Value =
            serde_json::from_str(&std::fs::read_to_string(layout.content_json()).unwrap()).unwrap();
        let repo = PackageRepository::new(&RealRuntime, layout.clone());

        let content = repo.load_content().unwrap();
        let manifest = repo.load_manifest().unwrap();
        repo.persist(&content, &manifest).unwrap();

        let written = std::fs::read_to_string(layout.content_json()).unwrap();
        let reparsed: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(reparsed, original);
        // Same text once whitespace is ignored, so key order survived too.
        let squash = |s: &str| s.split_whitespace().collect::<String>();
        assert_eq!(
            squash(&written),
            squash(&serde_json::to_string(&original).unwrap())
        );
    }
}
