use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::{
    package::{PackageRepository, stage_label, stage_library},
    runtime::Runtime,
};

use super::config::Config;

/// One line of the stage listing.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSummary {
    /// 1-based position
    pub position: usize,
    pub label: String,
    pub library: Option<String>,
}

impl StageSummary {
    pub fn render(&self) -> String {
        format!(
            "{:>2}. {}  [{}]",
            self.position,
            self.label,
            self.library.as_deref().unwrap_or("(none)")
        )
    }
}

pub fn stage_summaries<R: Runtime>(repo: &PackageRepository<'_, R>) -> Result<Vec<StageSummary>> {
    let content = repo.load_content()?;
    Ok(content
        .stages()
        .iter()
        .enumerate()
        .map(|(i, stage)| StageSummary {
            position: i + 1,
            label: stage_label(stage).unwrap_or_default().to_string(),
            library: stage_library(stage).map(str::to_string),
        })
        .collect())
}

/// List every stage with its position and current library
#[tracing::instrument(skip(runtime, package_dir))]
pub fn list<R: Runtime>(runtime: R, package_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(runtime, package_dir);
    let summaries = stage_summaries(&config.repository())?;

    if summaries.is_empty() {
        println!("No stages found.");
        return Ok(());
    }
    debug!("Found {} stage(s)", summaries.len());

    for summary in summaries {
        println!("{}", summary.render());
    }
    Ok(())
}
