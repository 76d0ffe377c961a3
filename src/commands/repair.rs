use anyhow::Result;
use log::{debug, warn};
use std::path::PathBuf;

use crate::{
    package::{LibraryRef, PackageRepository, clean_manifest, ensure_dependency, stage_library},
    runtime::Runtime,
};

use super::config::Config;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RepairReport {
    /// Entries inserted or completed
    pub ensured: Vec<String>,
    /// Incomplete entries dropped
    pub removed: usize,
    /// Stage libraries with no installed folder (declared with the referenced version)
    pub not_installed: Vec<String>,
}

/// Declare every library referenced by a stage, then clean the manifest.
///
/// The installed version is preferred; a library that is not installed is
/// declared with the version named in the stage.
#[tracing::instrument(skip(repo))]
pub fn repair_manifest<R: Runtime>(repo: &PackageRepository<'_, R>) -> Result<RepairReport> {
    let content = repo.load_content()?;
    let mut manifest = repo.load_manifest()?;
    let mut report = RepairReport::default();

    for stage in content.stages() {
        let Some(library) = stage_library(stage) else {
            continue;
        };
        let referenced: LibraryRef = match library.parse() {
            Ok(lib) => lib,
            Err(e) => {
                warn!("Skipping unparseable library '{}': {}", library, e);
                continue;
            }
        };

        let (major, minor) = match repo.resolve_installed_library(&referenced.machine_name)? {
            Some(installed) => (installed.major, installed.minor),
            None => {
                warn!("{} is not installed", referenced.machine_name);
                if !report.not_installed.contains(&referenced.machine_name) {
                    report.not_installed.push(referenced.machine_name.clone());
                }
                (referenced.major, referenced.minor)
            }
        };

        if ensure_dependency(&mut manifest, &referenced.machine_name, major, minor) {
            report.ensured.push(referenced.machine_name.clone());
        }
    }

    report.removed = clean_manifest(&mut manifest);
    debug!("Repair report: {:?}", report);
    repo.save_manifest(&manifest)?;
    Ok(report)
}

/// Repair missing or incomplete dependency declarations in `h5p.json`
#[tracing::instrument(skip(runtime, package_dir))]
pub fn repair<R: Runtime>(runtime: R, package_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(runtime, package_dir);
    let report = repair_manifest(&config.repository())?;

    if report.ensured.is_empty() && report.removed == 0 {
        println!("Dependencies are already consistent.");
    } else {
        for name in &report.ensured {
            println!("Declared {}", name);
        }
        if report.removed > 0 {
            println!("Removed {} incomplete dependency entries", report.removed);
        }
    }
    for name in &report.not_installed {
        println!("Warning: {} is not installed under libraries/", name);
    }
    Ok(())
}
