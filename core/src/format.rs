//! TreatRecord to Notion properties.

use crate::price::{has_amount, normalize_price};
use crate::record::TreatRecord;
use crate::schema::{PropertyKind, SchemaVersion, TreatField};
use crate::types::{Properties, PropertyValue, RichText, SelectOption};

/// Notion rejects rich text segments longer than this.
pub const MAX_SEGMENT_CHARS: usize = 2000;

/// Build the full property set for a create or update call.
///
/// Every field is always written, so an update clears values the caller left
/// empty.
pub fn format_properties(record: &TreatRecord, schema: SchemaVersion) -> Properties {
    TreatField::ALL
        .into_iter()
        .map(|field| {
            (
                field.property_name().to_string(),
                format_field(record, field, schema),
            )
        })
        .collect()
}

fn format_field(record: &TreatRecord, field: TreatField, schema: SchemaVersion) -> PropertyValue {
    let text = record.text(field);
    match field.kind(schema) {
        PropertyKind::Title => PropertyValue::Title(segments(text)),
        PropertyKind::RichText => PropertyValue::RichText(segments(text)),
        // Notion refuses "" for urls and select names; null clears them.
        PropertyKind::Url => PropertyValue::Url(non_empty(text).map(str::to_string)),
        PropertyKind::Select => PropertyValue::Select(select_option(field, text)),
        PropertyKind::Number => PropertyValue::Number(Some(record.rating.unwrap_or(0.0))),
        PropertyKind::Checkbox => PropertyValue::Checkbox(record.tried),
    }
}

/// A select value Notion would refuse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{field}' cannot contain a comma when stored as a select: {value:?}")]
pub struct InvalidSelect {
    pub field: &'static str,
    pub value: String,
}

/// Check the option names `format_properties` would write. Notion rejects
/// select option names containing a comma.
pub fn check_selects(record: &TreatRecord, schema: SchemaVersion) -> Result<(), InvalidSelect> {
    for field in TreatField::ALL {
        if field.kind(schema) != PropertyKind::Select {
            continue;
        }
        if let Some(option) = select_option(field, record.text(field)) {
            if option.name.contains(',') {
                return Err(InvalidSelect {
                    field: field.property_name(),
                    value: option.name,
                });
            }
        }
    }
    Ok(())
}

fn select_option(field: TreatField, text: &str) -> Option<SelectOption> {
    if field == TreatField::PriceRange {
        price_option(text)
    } else {
        non_empty(text).map(SelectOption::named)
    }
}

/// Bucketed amounts become the canonical label. Labels with no amount in
/// them are kept as option names; unbucketable amounts clear the select.
fn price_option(text: &str) -> Option<SelectOption> {
    match normalize_price(text) {
        Some(bucket) => Some(SelectOption::named(bucket.label())),
        None if !has_amount(text) => non_empty(text).map(SelectOption::named),
        None => None,
    }
}

/// Blank means null; anything else is written as given.
fn non_empty(text: &str) -> Option<&str> {
    (!text.trim().is_empty()).then_some(text)
}

fn segments(text: &str) -> Vec<RichText> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(MAX_SEGMENT_CHARS)
        .map(|chunk| RichText::plain(chunk.iter().collect::<String>()))
        .collect()
}
