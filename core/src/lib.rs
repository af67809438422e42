//! Sans-IO Notion client and treat record mapping.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values for the
//! handful of Notion endpoints the treat sync service talks to, without
//! touching the network. The caller executes the actual HTTP round-trip.
//!
//! # Design
//! - `NotionClient` holds only the base URL and the integration token.
//! - Each remote operation is split into `build_*` and `parse_*`.
//! - `TreatRecord` is the flat shape callers send and receive; `format` and
//!   `extract` translate it to and from Notion page properties.
//! - `price` canonicalizes free-form price text into the three select buckets.

pub mod client;
pub mod error;
pub mod extract;
pub mod format;
pub mod http;
pub mod price;
pub mod record;
pub mod schema;
pub mod types;

pub use client::NotionClient;
pub use error::ApiError;
pub use extract::extract_record;
pub use format::{check_selects, format_properties, InvalidSelect};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use price::{normalize_price, PriceBucket};
pub use record::TreatRecord;
pub use schema::{PropertyKind, SchemaVersion, TreatField};
pub use types::{
    CreatePage, Filter, Page, Parent, Properties, PropertyValue, QueryDatabase, QueryResponse,
    RichText, SelectOption, UpdatePage,
};
