//! Path-addressed document patching.
//!
//! An update set maps slash-delimited paths to replacement values, e.g.
//! `{"pagesProgress/intro/step_name": "loops"}`. Each entry is parsed once
//! into a [`PatchOp`] and then walked from the document root, creating
//! intermediate objects as needed.

use serde_json::{Map, Value};

/// One parsed update: the path segments to walk and the value to set.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchOp {
    segments: Vec<String>,
    value: Value,
}

impl PatchOp {
    /// Parse a slash-delimited path. Empty paths and paths with no
    /// non-empty segments yield `None` and are skipped by the merge.
    #[must_use]
    pub fn parse(path: &str, value: Value) -> Option<Self> {
        let segments: Vec<String> = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned)
            .collect();
        if segments.is_empty() {
            return None;
        }
        Some(Self { segments, value })
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    fn apply(self, root: &mut Map<String, Value>) {
        let Some((last, walk)) = self.segments.split_last() else {
            return;
        };
        let mut cursor = root;
        for key in walk {
            let slot = cursor
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            // Create-or-overwrite: a scalar, array, or null found along the
            // path is replaced by an object, never merged with one.
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            match slot {
                Value::Object(next) => cursor = next,
                _ => return,
            }
        }
        cursor.insert(last.clone(), self.value);
    }
}

/// Parse a raw update set, dropping entries with unusable paths.
#[must_use]
pub fn parse_update_set(updates: &Map<String, Value>) -> Vec<PatchOp> {
    updates
        .iter()
        .filter_map(|(path, value)| PatchOp::parse(path, value.clone()))
        .collect()
}

/// Merge an update set into a document, returning the updated copy.
///
/// The input document is never mutated. A document that is not a JSON
/// object is treated as an empty object before merging. Setting a path is
/// a full replacement of whatever was there, not a recursive merge.
#[must_use]
pub fn apply_patch(document: &Value, updates: &Map<String, Value>) -> Value {
    let mut root = match document {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    for op in parse_update_set(updates) {
        op.apply(&mut root);
    }
    Value::Object(root)
}
