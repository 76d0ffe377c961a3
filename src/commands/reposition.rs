use anyhow::Result;
use std::path::PathBuf;

use crate::{
    package::{PackageRepository, StageSelector},
    runtime::Runtime,
    stage::move_stage,
};

use super::config::Config;

fn coordinate(name: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.parse::<f64>().ok().filter(|v| v.is_finite()).is_none() {
        anyhow::bail!("--{} must be a finite number, got '{}'", name, value);
    }
    Ok(value.to_string())
}

/// Move the selected stage to `x`/`y`. Returns the stage label.
#[tracing::instrument(skip(repo))]
pub fn move_selected<R: Runtime>(
    repo: &PackageRepository<'_, R>,
    selector: &StageSelector,
    x: &str,
    y: &str,
) -> Result<String> {
    let x = coordinate("x", x)?;
    let y = coordinate("y", y)?;

    let mut content = repo.load_content()?;
    let position = content.resolve_stage(selector)?;
    let stage = content.stage_mut(position)?;
    move_stage(stage, &x, &y);
    let label = stage
        .get("label")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string();
    repo.save_content(&content)?;
    Ok(label)
}

#[tracing::instrument(skip(runtime, package_dir))]
pub fn move_to<R: Runtime>(
    runtime: R,
    package_dir: Option<PathBuf>,
    selector: StageSelector,
    x: &str,
    y: &str,
) -> Result<()> {
    let config = Config::new(runtime, package_dir);
    let label = move_selected(&config.repository(), &selector, x, y)?;
    println!("Moved stage '{}' to x={}, y={}", label, x.trim(), y.trim());
    Ok(())
}
