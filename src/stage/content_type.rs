//! Content-type payloads embedded in stages.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::package::LibraryRef;

pub const ADVANCED_TEXT: &str = "H5P.AdvancedText";
/// Version assumed for AdvancedText when it is not installed.
pub const ADVANCED_TEXT_FALLBACK: (u32, u32) = (1, 1);

pub const DEFAULT_IFRAME_WIDTH: u32 = 500;
pub const DEFAULT_IFRAME_HEIGHT: u32 = 380;

/// `{ library, params, metadata?, subContentId? }`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentType {
    pub library: String,
    pub params: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_content_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub license: String,
    pub title: String,
}

impl Metadata {
    /// Metadata with an unspecified ("U") license.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            content_type: None,
            license: "U".to_string(),
            title: title.into(),
        }
    }
}

/// An external page to embed through an iframe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IframeEmbed {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl IframeEmbed {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            width: DEFAULT_IFRAME_WIDTH,
            height: DEFAULT_IFRAME_HEIGHT,
        }
    }

    /// The iframe tag, verbatim. The URL is not escaped or validated.
    pub fn to_html(&self) -> String {
        format!(
            r#"<iframe style="max-width:100%" src="{}" width="{}" height="{}" frameborder="0" allowfullscreen></iframe>"#,
            self.url, self.width, self.height
        )
    }
}

/// AdvancedText content-type whose text is an iframe embedding `embed`.
pub fn build_iframe_content_type(embed: &IframeEmbed, label: &str, library: &LibraryRef) -> ContentType {
    ContentType {
        library: library.to_string(),
        params: json!({ "text": embed.to_html() }),
        metadata: Some(Metadata {
            content_type: Some("Advanced text".to_string()),
            ..Metadata::titled(label)
        }),
        sub_content_id: None,
    }
}
