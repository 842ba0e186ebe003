// src/models/item.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{error::AppError, models::kind::ItemKind};

/// A single JSON field as delivered by the content API.
///
/// Text is the expected case. Scalars of other types are kept verbatim so the
/// renderer can pass them through instead of rejecting the whole item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Field {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
    /// Arrays and objects. Never rendered as markup.
    Compound(Value),
}

impl Field {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Field::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Empty text, zero and `false` count as missing.
    fn is_blank(&self) -> bool {
        match self {
            Field::Text(text) => text.is_empty(),
            Field::Number(n) => n.as_f64() == Some(0.0),
            Field::Flag(flag) => !flag,
            Field::Compound(_) => false,
        }
    }
}

impl From<&str> for Field {
    fn from(text: &str) -> Self {
        Field::Text(text.to_string())
    }
}

/// Treats `null`, a missing key and a blank value alike.
fn present(field: &Option<Field>) -> Option<&Field> {
    field.as_ref().filter(|f| !f.is_blank())
}

/// One entry of the factsheet or newsletter list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Plain text.
    #[serde(default)]
    pub title: Option<Field>,

    /// Rich text (HTML fragment).
    #[serde(default)]
    pub intro: Option<Field>,

    /// `None` when the key is missing or not a list of sections.
    #[serde(default, deserialize_with = "lenient_list")]
    pub sections: Option<Vec<Section>>,

    #[serde(default)]
    pub link: Option<Field>,

    /// RFC 3339 / ISO-8601 text or epoch milliseconds.
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<Field>,
}

impl ContentItem {
    pub fn title(&self) -> Option<&Field> {
        present(&self.title)
    }

    pub fn intro(&self) -> Option<&Field> {
        present(&self.intro)
    }

    pub fn link(&self) -> Option<&Field> {
        present(&self.link)
    }

    pub fn created_at(&self) -> Option<&Field> {
        present(&self.created_at)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub title: Option<Field>,

    /// Rich-text paragraphs; `None` when missing or not a list.
    #[serde(default, deserialize_with = "lenient_list")]
    pub content: Option<Vec<Option<Field>>>,
}

impl Section {
    pub fn title(&self) -> Option<&Field> {
        present(&self.title)
    }
}

/// Decodes a list field, degrading to `None` when the value is not a list.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Array(entries) => Some(decode_entries(entries, "list")),
        _ => None,
    }))
}

/// Decodes each entry on its own; an entry of the wrong shape becomes `T::default()`.
fn decode_entries<T>(entries: Vec<Value>, what: &str) -> Vec<T>
where
    T: DeserializeOwned + Default,
{
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value(entry).unwrap_or_else(|e| {
                tracing::warn!("Malformed {} entry at index {}: {}", what, index, e);
                T::default()
            })
        })
        .collect()
}

/// Parses a `createdAt` field into a UTC instant.
pub fn parse_timestamp(field: &Field) -> Option<DateTime<Utc>> {
    match field {
        Field::Text(text) => {
            let text = text.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
                return Some(naive.and_utc());
            }
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
        Field::Number(millis) => millis.as_i64().and_then(DateTime::from_timestamp_millis),
        Field::Flag(_) | Field::Compound(_) => None,
    }
}

/// Error body returned by the content API on non-success statuses.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    message: Option<Value>,
}

impl ApiErrorBody {
    pub fn message(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
    }
}

/// Pulls `data.{kind}` out of a success payload.
///
/// A payload without a `{ data: { <kind>: [ ... ] } }` list yields `UnexpectedShape`
/// carrying the whole payload. Entries that are not objects render as default items.
pub fn extract_items(kind: ItemKind, payload: &Value) -> Result<Vec<ContentItem>, AppError> {
    let entries = payload
        .get("data")
        .and_then(|data| data.get(kind.path()))
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::UnexpectedShape(payload.clone()))?;

    Ok(decode_entries(entries.clone(), kind.path()))
}
