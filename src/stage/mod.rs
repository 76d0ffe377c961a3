//! Stage mutator
//!
//! Operations that rewrite a single stage node of the game map in place.
//! A stage is the JSON object found in the stage array, e.g.
//!
//! ```json
//! {
//!   "type": "stage",
//!   "label": "Quiz A",
//!   "telemetry": { "x": "30", "y": "40", "width": "4.375", "height": "7.777799959863713" },
//!   "contentsList": [{ "contentType": { "library": "H5P.Blanks 1.14", "params": {} } }]
//! }
//! ```

mod content_type;
mod import;

use anyhow::Result;
use log::debug;
use serde_json::{Map, Value, json};

pub use content_type::{
    ADVANCED_TEXT, ADVANCED_TEXT_FALLBACK, ContentType, DEFAULT_IFRAME_HEIGHT,
    DEFAULT_IFRAME_WIDTH, IframeEmbed, Metadata, build_iframe_content_type,
};
pub use import::{ImportedContent, build_imported_content_type};

/// Placeholder size the GameMap renderer expects on every stage.
pub const DEFAULT_STAGE_WIDTH: &str = "4.375";
pub const DEFAULT_STAGE_HEIGHT: &str = "7.777799959863713";

/// Fresh identifier for a sub-content slot.
pub fn new_sub_content_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn first_content_type_mut(stage: &mut Map<String, Value>) -> Option<&mut Map<String, Value>> {
    stage
        .get_mut("contentsList")?
        .as_array_mut()?
        .first_mut()?
        .get_mut("contentType")?
        .as_object_mut()
}

fn previous_sub_content_id(stage: &Map<String, Value>) -> Option<String> {
    stage
        .get("contentsList")?
        .get(0)?
        .get("contentType")?
        .get("subContentId")?
        .as_str()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Replace the stage's contents with a single slot holding `content_type`.
///
/// Unless `content_type` already carries a `subContentId`, the identifier of
/// the replaced content-type is kept; a new one is generated only when there
/// was none. Returns the identifier in use.
#[tracing::instrument(skip(stage, content_type), fields(library = %content_type.library))]
pub fn replace_content(stage: &mut Map<String, Value>, mut content_type: ContentType) -> Result<String> {
    let sub_content_id = match content_type.sub_content_id.take() {
        Some(id) => id,
        None => previous_sub_content_id(stage).unwrap_or_else(|| {
            let id = new_sub_content_id();
            debug!("Generated subContentId {}", id);
            id
        }),
    };
    content_type.sub_content_id = Some(sub_content_id.clone());

    stage.insert(
        "contentsList".to_string(),
        json!([{ "contentType": serde_json::to_value(&content_type)? }]),
    );
    Ok(sub_content_id)
}

/// Set the stage label, mirroring it into the content-type's metadata title
/// when metadata is present. Returns the previous label.
pub fn rename_stage(stage: &mut Map<String, Value>, new_label: &str) -> Option<String> {
    let previous = stage
        .insert("label".to_string(), Value::String(new_label.to_string()))
        .and_then(|v| v.as_str().map(str::to_string));

    if let Some(metadata) = first_content_type_mut(stage)
        .and_then(|ct| ct.get_mut("metadata"))
        .and_then(Value::as_object_mut)
    {
        metadata.insert("title".to_string(), Value::String(new_label.to_string()));
    }
    previous
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::Bool(b)) => !b,
        Some(_) => false,
    }
}

/// Set the stage position. Coordinates are stored as strings, as GameMap does.
///
/// Missing width/height are filled with the renderer's placeholder size;
/// existing ones are kept.
pub fn move_stage(stage: &mut Map<String, Value>, x: &str, y: &str) {
    if !stage.get("telemetry").is_some_and(Value::is_object) {
        stage.insert("telemetry".to_string(), Value::Object(Map::new()));
    }
    let Some(telemetry) = stage.get_mut("telemetry").and_then(Value::as_object_mut) else {
        return;
    };

    telemetry.insert("x".to_string(), Value::String(x.to_string()));
    telemetry.insert("y".to_string(), Value::String(y.to_string()));
    if is_blank(telemetry.get("width")) {
        telemetry.insert("width".to_string(), Value::String(DEFAULT_STAGE_WIDTH.to_string()));
    }
    if is_blank(telemetry.get("height")) {
        telemetry.insert("height".to_string(), Value::String(DEFAULT_STAGE_HEIGHT.to_string()));
    }
}
