//! Copying assets and library folders between packages.

use anyhow::Result;
use log::{debug, info};
use std::path::Path;

use crate::runtime::Runtime;

use super::PackageLayout;

/// Recursively merge `src` into `dst`, overwriting files that already exist.
#[tracing::instrument(skip(runtime))]
pub fn copy_dir<R: Runtime>(runtime: &R, src: &Path, dst: &Path) -> Result<usize> {
    runtime.create_dir_all(dst)?;
    if !runtime.exists(src) {
        return Ok(0);
    }

    let mut copied = 0;
    for entry in runtime.read_dir(src)? {
        let Some(name) = entry.file_name() else {
            continue;
        };
        let target = dst.join(name);
        if runtime.is_dir(&entry) {
            copied += copy_dir(runtime, &entry, &target)?;
        } else {
            runtime.copy(&entry, &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Copy everything under the source `content/` except `content.json` into the
/// destination `content/`.
#[tracing::instrument(skip(runtime, source, dest))]
pub fn copy_content_assets<R: Runtime>(
    runtime: &R,
    source: &PackageLayout,
    dest: &PackageLayout,
) -> Result<usize> {
    let src = source.content_dir();
    if !runtime.exists(&src) {
        debug!("No content directory in {:?}", source.root());
        return Ok(0);
    }
    let dst = dest.content_dir();
    runtime.create_dir_all(&dst)?;

    let mut copied = 0;
    for entry in runtime.read_dir(&src)? {
        let Some(name) = entry.file_name() else {
            continue;
        };
        if name.to_string_lossy().eq_ignore_ascii_case("content.json") {
            continue;
        }
        let target = dst.join(name);
        if runtime.is_dir(&entry) {
            copied += copy_dir(runtime, &entry, &target)?;
        } else {
            runtime.copy(&entry, &target)?;
            copied += 1;
        }
    }
    info!("Copied {} asset file(s) from {:?}", copied, src);
    Ok(copied)
}

/// Merge library folders from an import source into the destination
/// `libraries/`.
///
/// Library folders (directories holding `library.json`) are picked up from
/// `<source>/libraries/` and from the top level of `<source>`. Exports that
/// nest a folder inside itself (`X-1.0/X-1.0/library.json`) are flattened.
/// Returns the names of the imported folders.
#[tracing::instrument(skip(runtime, source, dest))]
pub fn import_libraries<R: Runtime>(
    runtime: &R,
    source: &PackageLayout,
    dest: &PackageLayout,
) -> Result<Vec<String>> {
    let dest_libs = dest.libraries_dir();
    runtime.create_dir_all(&dest_libs)?;

    let mut imported = Vec::new();
    for root in [source.libraries_dir(), source.root().to_path_buf()] {
        if !runtime.is_dir(&root) {
            continue;
        }
        for entry in runtime.read_dir(&root)? {
            let Some(name) = entry.file_name() else {
                continue;
            };
            let is_library = runtime.exists(&entry.join("library.json"))
                || runtime.exists(&entry.join(name).join("library.json"));
            if !runtime.is_dir(&entry) || !is_library {
                continue;
            }
            let target = dest_libs.join(name);
            copy_dir(runtime, &entry, &target)?;

            let nested = target.join(name);
            if runtime.exists(&nested.join("library.json")) {
                debug!("Flattening nested library folder {:?}", nested);
                copy_dir(runtime, &nested, &target)?;
                runtime.remove_dir_all(&nested)?;
            }
            imported.push(name.to_string_lossy().into_owned());
        }
    }

    if !imported.is_empty() {
        info!("Imported libraries: {}", imported.join(", "));
    }
    Ok(imported)
}
