//! Notion page properties back to a flat TreatRecord.
//!
//! Pages come back from shared databases in whatever state people left
//! them: columns renamed, values cleared, types switched. Nothing here
//! fails; anything that cannot be read leaves the field at its default.

use serde_json::{Map, Value};
use tracing::debug;

use crate::record::TreatRecord;
use crate::schema::TreatField;
use crate::types::{PropertyValue, RichText, SelectOption};

const STORAGE_TYPES: [&str; 6] = ["title", "rich_text", "url", "number", "checkbox", "select"];

static NULL: Value = Value::Null;

impl PropertyValue {
    /// Decode a property as Notion returns it. The `type` tag picks the
    /// variant; without one, the first storage key present does.
    /// Returns `None` for unsupported types and non-object values.
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let tag = match object.get("type").and_then(Value::as_str) {
            Some(tag) => tag,
            None => STORAGE_TYPES.into_iter().find(|key| object.contains_key(*key))?,
        };
        let body = object.get(tag).unwrap_or(&NULL);
        match tag {
            "title" => Some(PropertyValue::Title(segments(body))),
            "rich_text" => Some(PropertyValue::RichText(segments(body))),
            "url" => Some(PropertyValue::Url(body.as_str().map(str::to_string))),
            "number" => Some(PropertyValue::Number(body.as_f64())),
            "checkbox" => Some(PropertyValue::Checkbox(body.as_bool().unwrap_or(false))),
            "select" => Some(PropertyValue::Select(
                body.get("name").and_then(Value::as_str).map(SelectOption::named),
            )),
            other => {
                debug!(property_type = other, "unsupported property type");
                None
            }
        }
    }

    /// Text rendering for string-valued fields. Segments are concatenated.
    pub fn into_text(self) -> String {
        match self {
            PropertyValue::Title(parts) | PropertyValue::RichText(parts) => {
                parts.into_iter().map(|part| part.text.content).collect()
            }
            PropertyValue::Url(url) => url.unwrap_or_default(),
            PropertyValue::Select(option) => option.map(|o| o.name).unwrap_or_default(),
            PropertyValue::Number(_) | PropertyValue::Checkbox(_) => String::new(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => *n,
            _ => None,
        }
    }

    pub fn as_checkbox(&self) -> bool {
        matches!(self, PropertyValue::Checkbox(true))
    }
}

fn segments(body: &Value) -> Vec<RichText> {
    let Some(parts) = body.as_array() else {
        return Vec::new();
    };
    parts
        .iter()
        .filter_map(|part| {
            part.pointer("/text/content")
                .or_else(|| part.get("plain_text"))
                .and_then(Value::as_str)
                .map(RichText::plain)
        })
        .collect()
}

/// Rebuild the flat record from a page's properties.
pub fn extract_record(properties: &Map<String, Value>) -> TreatRecord {
    let mut record = TreatRecord::default();
    for field in TreatField::ALL {
        let Some(value) = properties
            .get(field.property_name())
            .and_then(PropertyValue::from_json)
        else {
            continue;
        };
        match field {
            TreatField::Rating => record.rating = value.as_number(),
            TreatField::Tried => record.tried = value.as_checkbox(),
            _ => {
                if let Some(slot) = record.text_mut(field) {
                    *slot = value.into_text();
                }
            }
        }
    }
    record
}
