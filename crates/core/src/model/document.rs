use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::page::PLACEHOLDER_SLUG;

/// A stored per-user progress document.
///
/// Only the fields the backend itself mutates are typed; everything else a
/// client has written lives in the `extra` side-bag and round-trips
/// unchanged through [`crate::patch::apply_patch`] and persistence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDocument {
    pub id: String,
    pub user_id: String,
    /// Mapping from page slug to that page's raw progress record.
    pub pages_progress: Map<String, Value>,
    /// Fields this backend forwards but does not interpret.
    pub extra: Map<String, Value>,
}

impl UserDocument {
    /// Parse a raw stored document.
    ///
    /// Anything that is not a JSON object is treated as an empty document,
    /// and malformed identity or `pagesProgress` fields fall back to their
    /// defaults rather than erroring.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let mut object = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let id = take_string(&mut object, "id");
        let user_id = take_string(&mut object, "userId");
        let pages_progress = match object.remove("pagesProgress") {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Self {
            id,
            user_id,
            pages_progress,
            extra: object,
        }
    }

    /// Reassemble the raw JSON form, side-bag fields included.
    #[must_use]
    pub fn into_value(self) -> Value {
        let mut object = Map::new();
        object.insert("id".to_owned(), Value::String(self.id));
        object.insert("userId".to_owned(), Value::String(self.user_id));
        for (key, value) in self.extra {
            object.insert(key, value);
        }
        object.insert(
            "pagesProgress".to_owned(),
            Value::Object(self.pages_progress),
        );
        Value::Object(object)
    }

    /// Force identity fields to the caller-supplied id when absent.
    ///
    /// `pagesProgress` is already guaranteed to be an object by
    /// construction; this fills in the identity half of the defaulting
    /// rules applied before and after a merge.
    pub fn ensure_defaults(&mut self, user_id: &str) {
        if self.id.is_empty() {
            self.id = user_id.to_owned();
        }
        if self.user_id.is_empty() {
            self.user_id = user_id.to_owned();
        }
    }

    /// The identity this document is stored under: `userId`, falling back
    /// to `id`. Empty when the document carries neither.
    #[must_use]
    pub fn identity(&self) -> &str {
        if self.user_id.is_empty() {
            &self.id
        } else {
            &self.user_id
        }
    }

    /// The view of this document returned to API callers.
    #[must_use]
    pub fn normalized(&self, user_id: &str) -> NormalizedUser {
        NormalizedUser {
            user_id: user_id.to_owned(),
            email: self
                .extra
                .get("email")
                .and_then(Value::as_str)
                .map(str::to_owned),
            page_slug: self
                .extra
                .get("pageSlug")
                .and_then(Value::as_str)
                .filter(|slug| !slug.is_empty())
                .unwrap_or(PLACEHOLDER_SLUG)
                .to_owned(),
            developer_mode: truthy(self.extra.get("developerMode")),
            editor_content: self
                .extra
                .get("editorContent")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            last_active_at: self
                .extra
                .get("lastActiveAt")
                .and_then(Value::as_str)
                .map(str::to_owned),
            is_admin: truthy(self.extra.get("isAdmin")),
            pages_progress: self.pages_progress.clone(),
        }
    }
}

/// The normalized shape of a user document as served by the API: every
/// field present, with documented defaults for anything the stored
/// document is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedUser {
    pub user_id: String,
    pub email: Option<String>,
    pub page_slug: String,
    pub developer_mode: bool,
    pub editor_content: String,
    pub last_active_at: Option<String>,
    pub is_admin: bool,
    pub pages_progress: Map<String, Value>,
}

/// Last-known step and timestamp for one user on one page, read leniently
/// out of the raw progress JSON. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressRecord {
    pub step_name: Option<String>,
    pub updated_at: Option<String>,
}

impl ProgressRecord {
    #[must_use]
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(Value::Object(record)) = value else {
            return Self::default();
        };
        Self {
            step_name: non_empty_string(record.get("step_name")),
            updated_at: non_empty_string(record.get("updated_at")),
        }
    }

    /// True when the record shows any activity beyond the defaults.
    #[must_use]
    pub fn has_timestamp(&self) -> bool {
        self.updated_at.is_some()
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|raw| !raw.is_empty())
        .map(str::to_owned)
}

fn take_string(object: &mut Map<String, Value>, key: &str) -> String {
    match object.remove(key) {
        Some(Value::String(raw)) => raw,
        _ => String::new(),
    }
}

/// JSON truthiness: null, false, zero, and the empty string are false.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(raw)) => !raw.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}
