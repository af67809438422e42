//! Notion wire DTOs.
//!
//! # Design
//! Outgoing property values are a closed enum serialized in Notion's write
//! shape (`{"title": [...]}`, `{"select": null}`, ...). Incoming pages keep
//! their properties as raw JSON; `extract` decodes them defensively so a
//! surprising shape never fails a whole export.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Property name to value, as sent on create and update.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A typed Notion property value, one variant per supported storage type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    Title(Vec<RichText>),
    RichText(Vec<RichText>),
    Url(Option<String>),
    Number(Option<f64>),
    Checkbox(bool),
    Select(Option<SelectOption>),
}

/// One rich text segment. Only plain text segments are produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RichText {
    pub text: TextContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextContent {
    pub content: String,
}

impl RichText {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            text: TextContent {
                content: content.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub name: String,
}

impl SelectOption {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A page as returned by Notion. Properties stay untyped until extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// Body of `POST /v1/databases/{id}/query`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryDatabase {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// A single-property database filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    pub property: String,
    #[serde(flatten)]
    pub condition: FilterCondition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCondition {
    Title(TextFilter),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextFilter {
    pub equals: String,
}

impl Filter {
    /// Exact, case-sensitive match on a title property.
    pub fn title_equals(property: &str, value: &str) -> Self {
        Self {
            property: property.to_string(),
            condition: FilterCondition::Title(TextFilter {
                equals: value.to_string(),
            }),
        }
    }
}

/// One page of query results.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Body of `POST /v1/pages`.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePage {
    pub parent: Parent,
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parent {
    pub database_id: String,
}

/// Body of `PATCH /v1/pages/{id}`. Omitted properties stay unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct UpdatePage {
    pub properties: Properties,
}
