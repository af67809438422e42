//! The flat treat record exchanged with callers.
//!
//! Deserialization is lenient: text fields accept any JSON scalar, `Rating`
//! accepts numbers or numeric strings, `Tried` accepts the usual truthy
//! spellings. Serialization emits `""` for an unset rating.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::schema::TreatField;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreatRecord {
    #[serde(rename = "Treat Name", deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(rename = "Category", deserialize_with = "lenient_text")]
    pub category: String,
    #[serde(rename = "Description", deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(rename = "Export Potential", deserialize_with = "lenient_text")]
    pub export_potential: String,
    #[serde(rename = "Photo", deserialize_with = "lenient_text")]
    pub photo: String,
    #[serde(rename = "Price Range", deserialize_with = "lenient_text")]
    pub price_range: String,
    #[serde(rename = "Product Type", deserialize_with = "lenient_text")]
    pub product_type: String,
    #[serde(rename = "Purchase URL", deserialize_with = "lenient_text")]
    pub purchase_url: String,
    #[serde(
        rename = "Rating",
        deserialize_with = "lenient_rating",
        serialize_with = "rating_or_empty"
    )]
    pub rating: Option<f64>,
    #[serde(rename = "Region", deserialize_with = "lenient_text")]
    pub region: String,
    #[serde(rename = "Shelf Life", deserialize_with = "lenient_text")]
    pub shelf_life: String,
    #[serde(rename = "Tried", deserialize_with = "lenient_flag")]
    pub tried: bool,
    #[serde(rename = "Where to Buy", deserialize_with = "lenient_text")]
    pub where_to_buy: String,
}

impl TreatRecord {
    /// Text content of a string-valued field. `Rating` and `Tried` have none.
    pub fn text(&self, field: TreatField) -> &str {
        match field {
            TreatField::Name => &self.name,
            TreatField::Category => &self.category,
            TreatField::Description => &self.description,
            TreatField::ExportPotential => &self.export_potential,
            TreatField::Photo => &self.photo,
            TreatField::PriceRange => &self.price_range,
            TreatField::ProductType => &self.product_type,
            TreatField::PurchaseUrl => &self.purchase_url,
            TreatField::Region => &self.region,
            TreatField::ShelfLife => &self.shelf_life,
            TreatField::WhereToBuy => &self.where_to_buy,
            TreatField::Rating | TreatField::Tried => "",
        }
    }

    pub fn text_mut(&mut self, field: TreatField) -> Option<&mut String> {
        match field {
            TreatField::Name => Some(&mut self.name),
            TreatField::Category => Some(&mut self.category),
            TreatField::Description => Some(&mut self.description),
            TreatField::ExportPotential => Some(&mut self.export_potential),
            TreatField::Photo => Some(&mut self.photo),
            TreatField::PriceRange => Some(&mut self.price_range),
            TreatField::ProductType => Some(&mut self.product_type),
            TreatField::PurchaseUrl => Some(&mut self.purchase_url),
            TreatField::Region => Some(&mut self.region),
            TreatField::ShelfLife => Some(&mut self.shelf_life),
            TreatField::WhereToBuy => Some(&mut self.where_to_buy),
            TreatField::Rating | TreatField::Tried => None,
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(scalar_text(&Value::deserialize(deserializer)?))
}

fn lenient_rating<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let rating = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    };
    Ok(rating.filter(|r: &f64| r.is_finite()))
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let text = scalar_text(&Value::deserialize(deserializer)?);
    Ok(matches!(
        text.trim().to_lowercase().as_str(),
        "yes" | "true" | "1"
    ))
}

fn rating_or_empty<S: Serializer>(rating: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match rating {
        Some(r) => serializer.serialize_f64(*r),
        None => serializer.serialize_str(""),
    }
}
