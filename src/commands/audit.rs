use anyhow::Result;
use serde_json::Value;
use std::path::PathBuf;

use crate::runtime::Runtime;

use super::config::Config;

/// A node whose `library` field is not a non-empty string.
#[derive(Debug, Clone, PartialEq)]
pub struct BadLibrary {
    /// Dotted path from the document root, e.g. `gamemapSteps.gamemap.elements.2.contentsList.0.contentType`
    pub path: String,
    pub library: Value,
}

/// Walk `document` and collect every object with a malformed `library` field.
pub fn find_bad_libraries(document: &Value) -> Vec<BadLibrary> {
    let mut bad = Vec::new();
    walk(document, &mut Vec::new(), &mut bad);
    bad
}

fn walk(node: &Value, path: &mut Vec<String>, bad: &mut Vec<BadLibrary>) {
    match node {
        Value::Object(map) => {
            if let Some(library) = map.get("library") {
                let valid = library.as_str().is_some_and(|s| !s.trim().is_empty());
                if !valid {
                    bad.push(BadLibrary {
                        path: path.join("."),
                        library: library.clone(),
                    });
                }
            }
            for (key, child) in map {
                path.push(key.clone());
                walk(child, path, bad);
                path.pop();
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                path.push(i.to_string());
                walk(child, path, bad);
                path.pop();
            }
        }
        _ => {}
    }
}

/// Report malformed `library` fields anywhere in `content.json`
#[tracing::instrument(skip(runtime, package_dir))]
pub fn audit<R: Runtime>(runtime: R, package_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(runtime, package_dir);
    let content = config.repository().load_content()?;
    let bad = find_bad_libraries(content.document());

    if bad.is_empty() {
        println!("No bad library entries.");
        return Ok(());
    }

    println!("Bad entries: {}", bad.len());
    for entry in bad {
        let path = if entry.path.is_empty() { "(root)" } else { entry.path.as_str() };
        println!("  {}: {}", path, entry.library);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_bad_libraries() {
        let doc = json!({
            "gamemapSteps": {
                "gamemap": {
                    "elements": [
                        { "contentsList": [{ "contentType": { "library": "H5P.Blanks 1.14" } }] },
                        { "contentsList": [{ "contentType": { "library": "" } }] },
                        { "contentsList": [{ "contentType": { "library": null, "params": {
                            "nested": { "library": 3 }
                        } } }] }
                    ]
                }
            }
        });

        let bad = find_bad_libraries(&doc);

        assert_eq!(
            bad,
            vec![
                BadLibrary {
                    path: "gamemapSteps.gamemap.elements.1.contentsList.0.contentType".into(),
                    library: json!(""),
                },
                BadLibrary {
                    path: "gamemapSteps.gamemap.elements.2.contentsList.0.contentType".into(),
                    library: Value::Null,
                },
                BadLibrary {
                    path: "gamemapSteps.gamemap.elements.2.contentsList.0.contentType.params.nested"
                        .into(),
                    library: json!(3),
                },
            ]
        );
    }

    #[test]
    fn test_find_bad_libraries_clean_document() {
        let doc = json!({ "a": [{ "library": "H5P.Image 1.1" }], "b": "library" });
        assert!(find_bad_libraries(&doc).is_empty());
    }
}
