//! Core data structures for the pushboard template store

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

/// Fixed-width timestamp layout, so lexicographic order matches chronological order
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z"
);

/// Current UTC time as a sortable ISO-8601 string
/// Example: "2024-06-01T09:30:00.000000Z"
pub fn now_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| "1970-01-01T00:00:00.000000Z".to_string())
}

/// Whether `value` was written by [`now_timestamp`].
///
/// Older files may carry local times without an offset; those cannot be
/// compared with UTC values.
pub fn is_utc_timestamp(value: &str) -> bool {
    value.len() == 27 && value.ends_with('Z') && value.as_bytes().get(10) == Some(&b'T')
}

/// A template record exactly as it lives on disk.
///
/// The id is not stored; it is the file name. Keys this type does not know
/// about are carried in `extra` so rewrites never drop them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Opaque payload, never interpreted by the store
    #[serde(rename = "data", default)]
    pub payload: Value,

    #[serde(rename = "thumb", default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    #[serde(default)]
    pub created: String,

    #[serde(default)]
    pub updated: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TemplateRecord {
    /// Display name, falling back to the id
    pub fn display_name(&self, id: &str) -> String {
        self.name.clone().unwrap_or_else(|| id.to_string())
    }

    /// Timestamp used for ordering listings: `updated`, else `created`
    pub fn sort_key(&self) -> &str {
        if self.updated.is_empty() {
            &self.created
        } else {
            &self.updated
        }
    }

    /// Overlay the fields present in `input`, leaving the rest untouched
    pub fn merge(&mut self, input: TemplateInput, updated: String) {
        if let Some(name) = input.name {
            self.name = Some(name);
        }
        if let Some(payload) = input.payload {
            self.payload = payload;
        }
        if let Some(thumbnail) = input.thumbnail {
            self.thumbnail = Some(thumbnail);
        }
        self.updated = updated;
    }

    pub fn into_template(self, id: String) -> Template {
        let name = self.display_name(&id);
        let mut extra = self.extra;
        extra.remove("id");

        Template {
            id,
            name,
            payload: self.payload,
            thumbnail: self.thumbnail,
            created: self.created,
            updated: self.updated,
            extra,
        }
    }

    pub fn summary(&self, id: &str) -> TemplateSummary {
        TemplateSummary {
            id: id.to_string(),
            name: self.display_name(id),
            thumbnail: self.thumbnail.clone().unwrap_or_default(),
            created: self.created.clone(),
            updated: self.updated.clone(),
        }
    }
}

/// Full template returned by a fetch, with its resolved id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(rename = "data")]
    pub payload: Value,
    #[serde(rename = "thumb", skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub created: String,
    pub updated: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Lightweight projection used by listings (no payload)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "thumb")]
    pub thumbnail: String,
    pub created: String,
    pub updated: String,
}

impl TemplateSummary {
    /// Listings are ordered by `updated`, falling back to `created`
    pub fn sort_key(&self) -> &str {
        if self.updated.is_empty() {
            &self.created
        } else {
            &self.updated
        }
    }
}

/// Caller-supplied fields for create and update.
///
/// Absent and `null` fields are both `None`, meaning "keep / use default".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TemplateInput {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(rename = "data", default)]
    pub payload: Option<Value>,

    #[serde(rename = "thumb", default)]
    pub thumbnail: Option<String>,

    /// Unrecognised keys; only counted towards emptiness
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TemplateInput {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// True when the request carried no fields at all
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.name.is_none()
            && self.payload.is_none()
            && self.thumbnail.is_none()
            && self.extra.is_empty()
    }
}

/// Outcome of a create
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedTemplate {
    pub id: String,
    pub name: String,
    pub created: String,
    pub message: String,
}

/// Outcome of an update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdatedTemplate {
    pub id: String,
    pub name: String,
    pub updated: String,
    pub message: String,
}
