use anyhow::Result;
use std::path::PathBuf;

use crate::{
    error::PackageError,
    package::{PackageRepository, StageSelector},
    runtime::Runtime,
    stage::rename_stage,
};

use super::config::Config;

/// Rename the selected stage. Returns the previous label.
#[tracing::instrument(skip(repo))]
pub fn rename_selected<R: Runtime>(
    repo: &PackageRepository<'_, R>,
    selector: &StageSelector,
    new_label: &str,
) -> Result<String> {
    let new_label = new_label.trim();
    if new_label.is_empty() {
        return Err(PackageError::MissingArgument("--to <new label> is required".into()).into());
    }

    let mut content = repo.load_content()?;
    let position = content.resolve_stage(selector)?;
    let previous = rename_stage(content.stage_mut(position)?, new_label).unwrap_or_default();
    repo.save_content(&content)?;
    Ok(previous)
}

#[tracing::instrument(skip(runtime, package_dir))]
pub fn rename<R: Runtime>(
    runtime: R,
    package_dir: Option<PathBuf>,
    selector: StageSelector,
    new_label: &str,
) -> Result<()> {
    let config = Config::new(runtime, package_dir);
    let previous = rename_selected(&config.repository(), &selector, new_label)?;
    println!("Renamed stage '{}' -> '{}'", previous, new_label.trim());
    Ok(())
}
