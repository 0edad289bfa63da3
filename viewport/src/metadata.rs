//! Embedded metadata extraction.
//!
//! Converted drawings carry a `<metadata>` block of `<text id="...">` entries.
//! Each entry is decoded as JSON, falling back to its trimmed text. The
//! `cadviewer_LayerTable` entry additionally decodes into [`LayerRecord`]s.

#[cfg(test)]
#[path = "metadata_test.rs"]
mod metadata_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::LAYER_TABLE_KEY;
use crate::doc::SvgDocument;
use crate::error::MetadataDecodeError;

/// One row of a conversion layer table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LayerRecord {
    pub name: String,
    #[serde(default)]
    pub off: bool,
    #[serde(default)]
    pub frozen: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub plottable: bool,
}

/// Metadata entries keyed by element id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    entries: Map<String, Value>,
}

impl Metadata {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The embedded layer table, if present.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataDecodeError::LayerTable`] when the entry exists but is
    /// not a list of layer records.
    pub fn layer_table(&self) -> Result<Option<Vec<LayerRecord>>, MetadataDecodeError> {
        let Some(value) = self.entries.get(LAYER_TABLE_KEY) else {
            return Ok(None);
        };
        serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|source| MetadataDecodeError::LayerTable { key: LAYER_TABLE_KEY.to_owned(), source })
    }

    /// All entries as one JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.entries.clone())
    }
}

/// Collect every `<metadata>` `<text>` entry in `doc`.
///
/// Entries without an id are logged and skipped. A later entry with the same
/// id replaces an earlier one.
#[must_use]
pub fn extract(doc: &SvgDocument) -> Metadata {
    let mut entries = Map::new();
    let mut index = 0;
    for block in doc.elements() {
        if doc.element(block).is_none_or(|el| el.local != "metadata") {
            continue;
        }
        for node in doc.descendants(block) {
            if doc.element(node).is_none_or(|el| el.local != "text") {
                continue;
            }
            index += 1;
            let Some(key) = doc.attr(node, "id").filter(|id| !id.is_empty()) else {
                let err = MetadataDecodeError::MissingId { index };
                tracing::warn!(error = %err, "skipping metadata entry");
                continue;
            };
            let text = doc.text_content(node);
            entries.insert(key.to_owned(), decode_value(text.trim()));
        }
    }
    tracing::debug!(entries = entries.len(), "metadata extracted");
    Metadata { entries }
}

fn decode_value(text: &str) -> Value {
    match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => Value::String(text.to_owned()),
    }
}
