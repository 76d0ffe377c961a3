//! The `h5p.json` manifest and its `preloadedDependencies` list.

use anyhow::Result;
use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::error::PackageError;

const DEPENDENCIES_KEY: &str = "preloadedDependencies";

/// One entry of `preloadedDependencies`.
///
/// Versions are read leniently: numbers, numeric strings and `null` are all
/// accepted, so that a hand-edited manifest can still be loaded and repaired.
/// A version that is not numeric at all (`"x"`) reads as missing and is written
/// back as `null`. Other keys of the entry are carried through unchanged.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub machine_name: String,
    #[serde(default, deserialize_with = "lenient_version")]
    pub major_version: Option<u32>,
    #[serde(default, deserialize_with = "lenient_version")]
    pub minor_version: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DependencyEntry {
    pub fn new(machine_name: impl Into<String>, major: u32, minor: u32) -> Self {
        Self {
            machine_name: machine_name.into(),
            major_version: Some(major),
            minor_version: Some(minor),
            extra: Map::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.machine_name.trim().is_empty()
            && self.major_version.is_some()
            && self.minor_version.is_some()
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

fn lenient_version<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// A loaded `h5p.json`.
///
/// The document is kept as an ordered map so fields this tool does not know
/// about are written back untouched and in place.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    document: Map<String, Value>,
    pub dependencies: Vec<DependencyEntry>,
}

impl Manifest {
    /// Wrap a parsed manifest. A missing dependency list is treated as empty.
    pub fn from_value(path: impl Into<PathBuf>, document: Value) -> Result<Self, PackageError> {
        let path = path.into();
        let Value::Object(document) = document else {
            return Err(PackageError::malformed(path, "not a JSON object"));
        };

        let dependencies = match document.get(DEPENDENCIES_KEY) {
            None | Some(Value::Null) => {
                debug!("No {} in {:?}, starting empty", DEPENDENCIES_KEY, path);
                Vec::new()
            }
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    if item.is_object() {
                        serde_json::from_value(item.clone())
                            .map_err(|e| PackageError::malformed(&path, e.to_string()))
                    } else {
                        // Placeholder with an empty name; clean_manifest drops it.
                        Ok(DependencyEntry::default())
                    }
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(PackageError::malformed(
                    path,
                    format!("{} is not an array", DEPENDENCIES_KEY),
                ));
            }
        };

        Ok(Self {
            path,
            document,
            dependencies,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The `mainLibrary` machine name, if declared.
    pub fn main_library(&self) -> Option<&str> {
        self.document
            .get("mainLibrary")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn find(&self, machine_name: &str) -> Option<&DependencyEntry> {
        self.dependencies
            .iter()
            .find(|d| d.machine_name == machine_name)
    }

    /// Rebuild the JSON document with the current dependency list.
    pub fn to_value(&self) -> Result<Value> {
        let mut document = self.document.clone();
        document.insert(
            DEPENDENCIES_KEY.to_string(),
            serde_json::to_value(&self.dependencies)?,
        );
        Ok(Value::Object(document))
    }
}

/// Declare `machine_name` in the manifest.
///
/// Inserts a new entry when the name is absent. An existing entry missing
/// either version gets both filled from `major`/`minor`. A fully specified
/// entry is never modified. Returns whether the manifest changed.
#[tracing::instrument(skip(manifest))]
pub fn ensure_dependency(manifest: &mut Manifest, machine_name: &str, major: u32, minor: u32) -> bool {
    if machine_name.trim().is_empty() {
        return false;
    }

    match manifest
        .dependencies
        .iter_mut()
        .find(|d| d.machine_name == machine_name)
    {
        None => {
            debug!("Adding dependency {} {}.{}", machine_name, major, minor);
            manifest
                .dependencies
                .push(DependencyEntry::new(machine_name, major, minor));
            true
        }
        Some(dep) if dep.major_version.is_none() || dep.minor_version.is_none() => {
            debug!(
                "Filling missing version of {} with {}.{}",
                machine_name, major, minor
            );
            dep.major_version = Some(major);
            dep.minor_version = Some(minor);
            true
        }
        Some(_) => false,
    }
}

/// Drop entries with a blank machine name or a missing version.
///
/// Duplicate machine names are left alone. Returns the number of entries removed.
#[tracing::instrument(skip(manifest))]
pub fn clean_manifest(manifest: &mut Manifest) -> usize {
    let before = manifest.dependencies.len();
    manifest.dependencies.retain(DependencyEntry::is_complete);
    let removed = before - manifest.dependencies.len();
    if removed > 0 {
        debug!("Removed {} incomplete dependency entries", removed);
    }
    removed
}
