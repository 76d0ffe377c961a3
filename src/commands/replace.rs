use anyhow::Result;
use log::{debug, info};
use std::path::PathBuf;

use crate::{
    package::{
        LibraryRef, PackageLayout, PackageRepository, StageSelector, clean_manifest,
        ensure_dependency, stage_label,
    },
    runtime::Runtime,
    stage::{
        ADVANCED_TEXT, ADVANCED_TEXT_FALLBACK, IframeEmbed, build_iframe_content_type,
        build_imported_content_type, replace_content,
    },
};

use super::config::Config;

/// What to put into the stage.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplaceSource {
    /// AdvancedText wrapping an iframe
    Iframe(IframeEmbed),
    /// Payload of an unpacked H5P export
    Import(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceOutcome {
    pub stage_label: String,
    pub library: LibraryRef,
    pub sub_content_id: String,
}

/// Replace the content of the selected stage and declare the new libraries.
#[tracing::instrument(skip(repo))]
pub fn replace_stage<R: Runtime>(
    repo: &PackageRepository<'_, R>,
    selector: &StageSelector,
    source: &ReplaceSource,
) -> Result<ReplaceOutcome> {
    let mut content = repo.load_content()?;
    let mut manifest = repo.load_manifest()?;
    let position = content.resolve_stage(selector)?;
    let label = content
        .stage(position)
        .and_then(stage_label)
        .unwrap_or_default()
        .to_string();
    debug!("Replacing stage #{} '{}'", position + 1, label);

    let (content_type, library, companions) = match source {
        ReplaceSource::Iframe(embed) => {
            let library = match repo.resolve_installed_library(ADVANCED_TEXT)? {
                Some(installed) => installed.to_ref(ADVANCED_TEXT),
                None => {
                    let (major, minor) = ADVANCED_TEXT_FALLBACK;
                    LibraryRef::new(ADVANCED_TEXT, major, minor)
                }
            };
            let content_type = build_iframe_content_type(embed, &label, &library);
            (content_type, library, Vec::new())
        }
        ReplaceSource::Import(folder) => {
            let imported =
                build_imported_content_type(repo, &PackageLayout::new(folder), &label)?;
            (imported.content_type, imported.library, imported.companions)
        }
    };

    let sub_content_id = replace_content(content.stage_mut(position)?, content_type)?;

    for lib in std::iter::once(&library).chain(companions.iter()) {
        ensure_dependency(&mut manifest, &lib.machine_name, lib.major, lib.minor);
    }
    clean_manifest(&mut manifest);

    repo.persist(&content, &manifest)?;
    info!("Replaced stage '{}' with {}", label, library);

    Ok(ReplaceOutcome {
        stage_label: label,
        library,
        sub_content_id,
    })
}

#[tracing::instrument(skip(runtime, package_dir))]
pub fn replace<R: Runtime>(
    runtime: R,
    package_dir: Option<PathBuf>,
    selector: StageSelector,
    source: ReplaceSource,
) -> Result<()> {
    let config = Config::new(runtime, package_dir);
    let outcome = replace_stage(&config.repository(), &selector, &source)?;

    match &source {
        ReplaceSource::Iframe(_) => println!(
            "Replaced stage '{}' with iframe embed using {}",
            outcome.stage_label, outcome.library
        ),
        ReplaceSource::Import(folder) => println!(
            "Replaced stage '{}' with {} from {}",
            outcome.stage_label,
            outcome.library,
            folder.display()
        ),
    }
    Ok(())
}
