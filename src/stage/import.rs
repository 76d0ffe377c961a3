//! Building a stage payload from another, independently exported package.

use anyhow::Result;
use log::info;

use crate::error::PackageError;
use crate::package::{
    LibraryRef, Manifest, PackageLayout, PackageRepository, copy_content_assets,
    import_libraries, read_json,
};
use crate::runtime::Runtime;

use super::{ContentType, Metadata};

/// Libraries that must be declared alongside a main library.
const COMPANION_LIBRARIES: &[(&str, &str)] = &[("H5P.SpeakTheWordsSet", "H5P.SpeakTheWords")];

/// Result of preparing an imported payload.
#[derive(Debug)]
pub struct ImportedContent {
    pub content_type: ContentType,
    pub library: LibraryRef,
    /// Installed companions of `library` that should also be declared
    pub companions: Vec<LibraryRef>,
    pub libraries_imported: Vec<String>,
    pub assets_copied: usize,
}

/// Build a content-type from the unpacked export at `source`.
///
/// The export's `mainLibrary` names the content-type and its
/// `content/content.json` becomes `params` as-is. Library folders shipped with
/// the export are merged into the destination package first, so the version is
/// resolved against what is installed afterwards. Non-JSON assets under the
/// export's `content/` are copied across.
#[tracing::instrument(skip(repo, source))]
pub fn build_imported_content_type<R: Runtime>(
    repo: &PackageRepository<'_, R>,
    source: &PackageLayout,
    stage_label: &str,
) -> Result<ImportedContent> {
    let runtime = repo.runtime();
    if !runtime.is_dir(source.root()) {
        return Err(PackageError::malformed(source.root(), "import folder not found").into());
    }

    let manifest_path = source.manifest_json();
    if !runtime.exists(&manifest_path) {
        return Err(PackageError::malformed(&manifest_path, "file not found").into());
    }
    let source_manifest = Manifest::from_value(&manifest_path, read_json(runtime, &manifest_path)?)?;
    let main_library = source_manifest
        .main_library()
        .ok_or_else(|| PackageError::malformed(&manifest_path, "could not determine mainLibrary"))?
        .to_string();

    let params_path = source.content_json();
    if !runtime.exists(&params_path) {
        return Err(PackageError::malformed(&params_path, "file not found").into());
    }
    let params = read_json(runtime, &params_path)?;

    let libraries_imported = import_libraries(runtime, source, repo.layout())?;
    let installed = repo.require_installed_library(&main_library)?;
    let library = installed.to_ref(&main_library);

    let mut companions = Vec::new();
    for (main, companion) in COMPANION_LIBRARIES {
        if *main == main_library
            && let Some(found) = repo.resolve_installed_library(companion)?
        {
            companions.push(found.to_ref(companion));
        }
    }

    let assets_copied = copy_content_assets(runtime, source, repo.layout())?;
    info!("Prepared {} from {:?}", library, source.root());

    Ok(ImportedContent {
        content_type: ContentType {
            library: library.to_string(),
            params,
            metadata: Some(Metadata::titled(stage_label)),
            sub_content_id: None,
        },
        library,
        companions,
        libraries_imported,
        assets_copied,
    })
}
