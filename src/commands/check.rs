use anyhow::Result;
use std::path::PathBuf;

use crate::{
    package::{PackageRepository, StageSelector, first_content_type, stage_label},
    runtime::Runtime,
};

use super::config::Config;

/// Shape of a stage's first content-type.
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub label: String,
    pub has_content_type: bool,
    pub library: Option<String>,
    pub has_params: bool,
}

pub fn inspect_stage<R: Runtime>(
    repo: &PackageRepository<'_, R>,
    selector: &StageSelector,
) -> Result<StageReport> {
    let content = repo.load_content()?;
    let position = content.resolve_stage(selector)?;
    let stage = content.stage(position);
    let content_type = stage.and_then(first_content_type);

    Ok(StageReport {
        label: stage.and_then(stage_label).unwrap_or_default().to_string(),
        has_content_type: content_type.is_some_and(|ct| ct.is_object()),
        library: content_type
            .and_then(|ct| ct.get("library"))
            .and_then(|l| l.as_str())
            .map(str::to_string),
        has_params: content_type
            .and_then(|ct| ct.get("params"))
            .is_some_and(|p| !p.is_null()),
    })
}

/// Print what the selected stage currently embeds
#[tracing::instrument(skip(runtime, package_dir))]
pub fn check<R: Runtime>(runtime: R, package_dir: Option<PathBuf>, selector: StageSelector) -> Result<()> {
    let config = Config::new(runtime, package_dir);
    let report = inspect_stage(&config.repository(), &selector)?;

    println!("Stage: {}", report.label);
    println!("Has contentType: {}", report.has_content_type);
    println!("Library: {}", report.library.as_deref().unwrap_or("(none)"));
    println!("Has params: {}", report.has_params);
    Ok(())
}
