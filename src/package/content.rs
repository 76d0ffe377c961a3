//! The `content.json` document and its game-map stage array.

use anyhow::Result;
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::PackageError;

/// Where GameMap keeps its stages in the package versions we know about.
pub const STAGES_POINTER: &str = "/gamemapSteps/gamemap/elements";

/// How a stage is addressed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageSelector {
    /// Exact label match after trimming whitespace on both sides
    Label(String),
    /// 1-based position in the stage array
    Index(usize),
}

impl fmt::Display for StageSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageSelector::Label(label) => write!(f, "'{}'", label),
            StageSelector::Index(index) => write!(f, "#{}", index),
        }
    }
}

/// Locate the stage array in a content document.
///
/// Returns a JSON pointer to the array. The fixed GameMap path is tried first;
/// otherwise the first `elements` array (depth-first, document order) whose
/// items are all objects tagged `"type": "stage"` is used.
pub fn locate_stages(document: &Value) -> Option<String> {
    if document
        .pointer(STAGES_POINTER)
        .is_some_and(Value::is_array)
    {
        return Some(STAGES_POINTER.to_string());
    }
    search_stage_array(document, String::new())
}

fn search_stage_array(node: &Value, pointer: String) -> Option<String> {
    match node {
        Value::Object(map) => {
            if let Some(Value::Array(items)) = map.get("elements")
                && !items.is_empty()
                && items.iter().all(is_stage_node)
            {
                return Some(format!("{}/elements", pointer));
            }
            map.iter().find_map(|(key, child)| {
                search_stage_array(child, format!("{}/{}", pointer, escape_pointer_token(key)))
            })
        }
        Value::Array(items) => items
            .iter()
            .enumerate()
            .find_map(|(i, child)| search_stage_array(child, format!("{}/{}", pointer, i))),
        _ => None,
    }
}

fn is_stage_node(item: &Value) -> bool {
    item.get("type").and_then(Value::as_str) == Some("stage")
}

fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Label of a stage node, if it has a string label.
pub fn stage_label(stage: &Value) -> Option<&str> {
    stage.get("label").and_then(Value::as_str)
}

/// The first content-type embedded in a stage.
pub fn first_content_type(stage: &Value) -> Option<&Value> {
    stage.pointer("/contentsList/0/contentType")
}

/// Library string of the stage's first content-type.
pub fn stage_library(stage: &Value) -> Option<&str> {
    first_content_type(stage)
        .and_then(|ct| ct.get("library"))
        .and_then(Value::as_str)
}

/// A loaded `content.json` with its stage array located.
#[derive(Debug, Clone)]
pub struct ContentDocument {
    path: PathBuf,
    document: Value,
    stages_pointer: String,
}

impl ContentDocument {
    /// Wrap a parsed document, failing with `MalformedPackage` if it is not an
    /// object or carries no stage array.
    pub fn from_value(path: impl Into<PathBuf>, document: Value) -> Result<Self, PackageError> {
        let path = path.into();
        if !document.is_object() {
            return Err(PackageError::malformed(path, "not a JSON object"));
        }
        let stages_pointer = locate_stages(&document).ok_or_else(|| {
            PackageError::malformed(&path, "couldn't find the GameMap elements array")
        })?;
        Ok(Self {
            path,
            document,
            stages_pointer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn stages_pointer(&self) -> &str {
        &self.stages_pointer
    }

    pub fn stages(&self) -> &[Value] {
        self.document
            .pointer(&self.stages_pointer)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn stage_count(&self) -> usize {
        self.stages().len()
    }

    /// Resolve a selector to a 0-based position in the stage array.
    ///
    /// Label collisions resolve to the first match.
    pub fn resolve_stage(&self, selector: &StageSelector) -> Result<usize, PackageError> {
        let stages = self.stages();
        match selector {
            StageSelector::Index(index) => {
                if (1..=stages.len()).contains(index) {
                    Ok(index - 1)
                } else {
                    Err(PackageError::IndexOutOfRange {
                        index: *index,
                        count: stages.len(),
                    })
                }
            }
            StageSelector::Label(label) => {
                let wanted = label.trim();
                stages
                    .iter()
                    .position(|stage| stage_label(stage).is_some_and(|l| l.trim() == wanted))
                    .ok_or_else(|| PackageError::StageNotFound {
                        label: label.clone(),
                    })
            }
        }
    }

    pub fn stage(&self, position: usize) -> Option<&Value> {
        self.stages().get(position)
    }

    /// Mutable access to a stage node, which must be a JSON object.
    pub fn stage_mut(&mut self, position: usize) -> Result<&mut Map<String, Value>, PackageError> {
        let path = &self.path;
        self.document
            .pointer_mut(&self.stages_pointer)
            .and_then(Value::as_array_mut)
            .and_then(|stages| stages.get_mut(position))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| {
                PackageError::malformed(path, format!("stage #{} is not an object", position + 1))
            })
    }

    pub fn into_value(self) -> Value {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn game_map(stages: Value) -> Value {
        json!({
            "gamemapSteps": {
                "gamemap": { "elements": stages },
                "backgroundImageSettings": {}
            },
            "behaviour": {}
        })
    }

    fn three_stages() -> ContentDocument {
        let doc = game_map(json!([
            { "type": "stage", "label": "Intro" },
            { "type": "stage", "label": "  Quiz A " },
            { "type": "stage", "label": "Quiz A" }
        ]));
        ContentDocument::from_value("content.json", doc).unwrap()
    }

    #[test]
    fn test_locate_stages_fixed_path() {
        let doc = game_map(json!([{ "type": "stage", "label": "One" }]));
        assert_eq!(locate_stages(&doc).as_deref(), Some(STAGES_POINTER));
    }

    #[test]
    fn test_locate_stages_structural_fallback() {
        let doc = json!({
            "settings": { "elements": [{ "type": "path" }] },
            "map/v2": {
                "layers": [
                    { "elements": [{ "type": "stage", "label": "A" }, { "type": "stage", "label": "B" }] }
                ]
            }
        });
        assert_eq!(
            locate_stages(&doc).as_deref(),
            Some("/map~1v2/layers/0/elements")
        );
        let pointer = locate_stages(&doc).unwrap();
        assert_eq!(doc.pointer(&pointer).unwrap().as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_locate_stages_not_found() {
        let doc = json!({ "elements": [{ "type": "stage" }, { "type": "path" }] });
        assert_eq!(locate_stages(&doc), None);
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        let err = ContentDocument::from_value("content.json", json!([1, 2])).unwrap_err();
        assert!(matches!(err, PackageError::MalformedPackage { .. }));
    }

    #[test]
    fn test_from_value_rejects_missing_stages() {
        let err = ContentDocument::from_value("content.json", json!({ "a": 1 })).unwrap_err();
        assert!(matches!(err, PackageError::MalformedPackage { .. }));
    }

    #[test]
    fn test_resolve_by_label_trims_and_first_match_wins() {
        let doc = three_stages();
        let pos = doc
            .resolve_stage(&StageSelector::Label("Quiz A".into()))
            .unwrap();
        assert_eq!(pos, 1);
    }

    #[test]
    fn test_resolve_by_label_not_found() {
        let doc = three_stages();
        let err = doc
            .resolve_stage(&StageSelector::Label("Outro".into()))
            .unwrap_err();
        assert_eq!(
            err,
            PackageError::StageNotFound {
                label: "Outro".into()
            }
        );
    }

    #[test]
    fn test_resolve_index_bounds() {
        let doc = three_stages();
        assert_eq!(doc.resolve_stage(&StageSelector::Index(1)).unwrap(), 0);
        assert_eq!(doc.resolve_stage(&StageSelector::Index(3)).unwrap(), 2);
        assert_eq!(
            doc.resolve_stage(&StageSelector::Index(0)).unwrap_err(),
            PackageError::IndexOutOfRange { index: 0, count: 3 }
        );
        assert_eq!(
            doc.resolve_stage(&StageSelector::Index(4)).unwrap_err(),
            PackageError::IndexOutOfRange { index: 4, count: 3 }
        );
    }

    #[test]
    fn test_index_and_label_agree_for_unique_labels() {
        let doc = ContentDocument::from_value(
            "content.json",
            game_map(json!([
                { "type": "stage", "label": "North" },
                { "type": "stage", "label": "East" },
                { "type": "stage", "label": "South" },
                { "type": "stage", "label": "West" }
            ])),
        )
        .unwrap();

        for i in 1..=doc.stage_count() {
            let label = stage_label(doc.stage(i - 1).unwrap()).unwrap().to_string();
            assert_eq!(
                doc.resolve_stage(&StageSelector::Index(i)).unwrap(),
                doc.resolve_stage(&StageSelector::Label(label)).unwrap()
            );
        }
    }

    #[test]
    fn test_stage_library() {
        let stage = json!({
            "contentsList": [{ "contentType": { "library": "H5P.Blanks 1.14" } }]
        });
        assert_eq!(stage_library(&stage), Some("H5P.Blanks 1.14"));
        assert_eq!(stage_library(&json!({ "contentsList": [] })), None);
    }

    #[test]
    fn test_stage_mut_rejects_non_object() {
        let mut doc = ContentDocument::from_value(
            "content.json",
            json!({ "gamemapSteps": { "gamemap": { "elements": [null] } } }),
        )
        .unwrap();
        assert!(doc.stage_mut(0).is_err());
    }
}
