//! Installed libraries and library references.

use anyhow::Result;
use log::{debug, warn};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::runtime::Runtime;

use super::json::read_json;

/// A `"<MachineName> <major>.<minor>"` reference as used in content-types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryRef {
    pub machine_name: String,
    pub major: u32,
    pub minor: u32,
}

impl LibraryRef {
    pub fn new(machine_name: impl Into<String>, major: u32, minor: u32) -> Self {
        Self {
            machine_name: machine_name.into(),
            major,
            minor,
        }
    }
}

impl fmt::Display for LibraryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}.{}", self.machine_name, self.major, self.minor)
    }
}

impl FromStr for LibraryRef {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, version) = s
            .trim()
            .split_once(' ')
            .ok_or_else(|| anyhow::anyhow!("Invalid library string '{}'. Expected 'Name major.minor'.", s))?;
        let (major, minor) = version
            .trim()
            .split_once('.')
            .ok_or_else(|| anyhow::anyhow!("Invalid library version in '{}'", s))?;
        Ok(Self {
            machine_name: name.to_string(),
            major: major.parse()?,
            minor: minor.parse()?,
        })
    }
}

/// The fields of `library.json` this tool reads.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct LibraryDescriptor {
    pub machine_name: Option<String>,
    #[serde(default)]
    pub major_version: serde_json::Value,
    #[serde(default)]
    pub minor_version: serde_json::Value,
}

/// A library folder found under `libraries/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledLibrary {
    pub folder: String,
    pub major: u32,
    pub minor: u32,
}

impl InstalledLibrary {
    pub fn to_ref(&self, machine_name: &str) -> LibraryRef {
        LibraryRef::new(machine_name, self.major, self.minor)
    }
}

fn version_number(value: &serde_json::Value) -> u32 {
    match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()).unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Find the installed folder for `machine_name` under `libraries_dir`.
///
/// Folders are named `<machine_name>-<major>.<minor>`; the first match in name
/// order that carries a `library.json` wins. Returns `Ok(None)` when nothing
/// matches, leaving it to the caller whether that is fatal.
#[tracing::instrument(skip(runtime, libraries_dir))]
pub fn find_installed_library<R: Runtime>(
    runtime: &R,
    libraries_dir: &Path,
    machine_name: &str,
) -> Result<Option<InstalledLibrary>> {
    if !runtime.exists(libraries_dir) {
        debug!("Libraries directory {:?} does not exist", libraries_dir);
        return Ok(None);
    }

    let pattern = glob::Pattern::new(&format!("{}-*", glob::Pattern::escape(machine_name)))?;

    for entry in runtime.read_dir(libraries_dir)? {
        let Some(folder) = entry.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !pattern.matches(folder) {
            continue;
        }
        let descriptor_path = entry.join("library.json");
        if !runtime.exists(&descriptor_path) {
            warn!("{} has no library.json, skipping", folder);
            continue;
        }
        let descriptor: LibraryDescriptor =
            serde_json::from_value(read_json(runtime, &descriptor_path)?)?;
        let installed = InstalledLibrary {
            folder: folder.to_string(),
            major: version_number(&descriptor.major_version),
            minor: version_number(&descriptor.minor_version),
        };
        debug!("Resolved {} to {:?}", machine_name, installed);
        return Ok(Some(installed));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use std::path::PathBuf;

    #[test]
    fn test_library_ref_parse_and_display() {
        let lib: LibraryRef = "H5P.AdvancedText 1.1".parse().unwrap();
        assert_eq!(lib, LibraryRef::new("H5P.AdvancedText", 1, 1));
        assert_eq!(lib.to_string(), "H5P.AdvancedText 1.1");

        assert!("H5P.AdvancedText".parse::<LibraryRef>().is_err());
        assert!("H5P.AdvancedText one.two".parse::<LibraryRef>().is_err());
    }

    #[test_log::test]
    fn test_find_installed_library() {
        let mut runtime = MockRuntime::new();
        let libs = PathBuf::from("/pkg/libraries");

        // --- 1. Check libraries dir exists ---
        runtime
            .expect_exists()
            .with(eq(libs.clone()))
            .returning(|_| true);

        // --- 2. Scan: the Set folder must not match the single-item name ---
        runtime
            .expect_read_dir()
            .with(eq(libs.clone()))
            .returning(|p| {
                Ok(vec![
                    p.join("H5P.SpeakTheWords-1.5"),
                    p.join("H5P.SpeakTheWordsSet-1.3"),
                ])
            });

        // --- 3. Read descriptor ---
        let descriptor = libs.join("H5P.SpeakTheWordsSet-1.3/library.json");
        runtime
            .expect_exists()
            .with(eq(descriptor.clone()))
            .returning(|_| true);
        runtime
            .expect_read_to_string()
            .with(eq(descriptor))
            .returning(|_| {
                Ok(r#"{"machineName": "H5P.SpeakTheWordsSet", "majorVersion": 1, "minorVersion": 3}"#.into())
            });

        let found = find_installed_library(&runtime, &libs, "H5P.SpeakTheWordsSet").unwrap();
        assert_eq!(
            found,
            Some(InstalledLibrary {
                folder: "H5P.SpeakTheWordsSet-1.3".into(),
                major: 1,
                minor: 3,
            })
        );
    }

    #[test]
    fn test_find_installed_library_missing_dir() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| false);

        let found =
            find_installed_library(&runtime, Path::new("/pkg/libraries"), "H5P.AdvancedText").unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn test_find_installed_library_no_match() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_read_dir()
            .returning(|p| Ok(vec![p.join("H5P.Blanks-1.14")]));

        let found =
            find_installed_library(&runtime, Path::new("/pkg/libraries"), "H5P.AdvancedText").unwrap();
        assert_eq!(found, None);
    }
}
