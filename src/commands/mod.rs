//! Command entry points, one per subcommand.
//!
//! Each command builds a [`Config`](config::Config) from the runtime and the
//! optional package directory, runs the operation and prints a short summary.

use crate::{error::PackageError, package::StageSelector};

mod audit;
mod check;
pub mod config;
mod list;
mod rename;
mod repair;
mod replace;
mod reposition;

pub use audit::{BadLibrary, audit, find_bad_libraries};
pub use check::{StageReport, check, inspect_stage};
pub use list::{StageSummary, list, stage_summaries};
pub use rename::{rename, rename_selected};
pub use repair::{RepairReport, repair, repair_manifest};
pub use replace::{ReplaceOutcome, ReplaceSource, replace, replace_stage};
pub use reposition::{move_selected, move_to};

/// Build a selector from `--stage`/`--index`. The index wins if both are set.
pub fn stage_selector(
    stage: Option<String>,
    index: Option<usize>,
) -> Result<StageSelector, PackageError> {
    match (index, stage) {
        (Some(index), _) => Ok(StageSelector::Index(index)),
        (None, Some(label)) if !label.trim().is_empty() => Ok(StageSelector::Label(label)),
        _ => Err(PackageError::MissingArgument(
            "provide --stage <label> or --index <n>".into(),
        )),
    }
}
