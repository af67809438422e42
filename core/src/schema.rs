//! The treat database layout: which Notion property backs each field and
//! with which storage type.

use std::fmt;
use std::str::FromStr;

/// Notion storage type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Title,
    RichText,
    Url,
    Number,
    Checkbox,
    Select,
}

/// Which generation of the database layout to write.
///
/// Older databases stored the enumeration fields as free text; current ones
/// use single-select properties. Extraction reads either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaVersion {
    Text,
    #[default]
    Select,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown schema version {0:?}, expected \"select\" or \"text\"")]
pub struct UnknownSchema(pub String);

impl FromStr for SchemaVersion {
    type Err = UnknownSchema;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "select" => Ok(SchemaVersion::Select),
            "text" | "legacy" => Ok(SchemaVersion::Text),
            _ => Err(UnknownSchema(s.to_string())),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SchemaVersion::Text => "text",
            SchemaVersion::Select => "select",
        })
    }
}

/// One column of the treat database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreatField {
    Name,
    Category,
    Description,
    ExportPotential,
    Photo,
    PriceRange,
    ProductType,
    PurchaseUrl,
    Rating,
    Region,
    ShelfLife,
    Tried,
    WhereToBuy,
}

impl TreatField {
    pub const ALL: [TreatField; 13] = [
        TreatField::Name,
        TreatField::Category,
        TreatField::Description,
        TreatField::ExportPotential,
        TreatField::Photo,
        TreatField::PriceRange,
        TreatField::ProductType,
        TreatField::PurchaseUrl,
        TreatField::Rating,
        TreatField::Region,
        TreatField::ShelfLife,
        TreatField::Tried,
        TreatField::WhereToBuy,
    ];

    /// Notion property name, identical to the key in the flat record.
    pub fn property_name(self) -> &'static str {
        match self {
            TreatField::Name => "Treat Name",
            TreatField::Category => "Category",
            TreatField::Description => "Description",
            TreatField::ExportPotential => "Export Potential",
            TreatField::Photo => "Photo",
            TreatField::PriceRange => "Price Range",
            TreatField::ProductType => "Product Type",
            TreatField::PurchaseUrl => "Purchase URL",
            TreatField::Rating => "Rating",
            TreatField::Region => "Region",
            TreatField::ShelfLife => "Shelf Life",
            TreatField::Tried => "Tried",
            TreatField::WhereToBuy => "Where to Buy",
        }
    }

    pub fn is_enumeration(self) -> bool {
        matches!(
            self,
            TreatField::Category
                | TreatField::ExportPotential
                | TreatField::PriceRange
                | TreatField::ProductType
                | TreatField::Region
                | TreatField::ShelfLife
        )
    }

    pub fn kind(self, schema: SchemaVersion) -> PropertyKind {
        match self {
            TreatField::Name => PropertyKind::Title,
            TreatField::Photo | TreatField::PurchaseUrl => PropertyKind::Url,
            TreatField::Rating => PropertyKind::Number,
            TreatField::Tried => PropertyKind::Checkbox,
            field if field.is_enumeration() && schema == SchemaVersion::Select => {
                PropertyKind::Select
            }
            _ => PropertyKind::RichText,
        }
    }
}
