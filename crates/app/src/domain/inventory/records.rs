//! Inventory Records

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{domain::products::records::ProductUuid, uuids::TypedUuid};

/// Garment size. The fixed set of sizes a product can stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Size {
    S,
    M,
    L,
    Xl,
    Xxl,
}

impl Size {
    /// The value stored in the `size` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Size::S => "S",
            Size::M => "M",
            Size::L => "L",
            Size::Xl => "XL",
            Size::Xxl => "XXL",
        }
    }

    /// Parses a stored column value back into a size.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "S" => Some(Size::S),
            "M" => Some(Size::M),
            "L" => Some(Size::L),
            "XL" => Some(Size::Xl),
            "XXL" => Some(Size::Xxl),
            _ => None,
        }
    }
}

/// Size Stock UUID
pub type SizeStockUuid = TypedUuid<SizeStockRecord>;

/// Size Stock Record
///
/// The inventory unit: one stock counter per (product, size) pair.
#[derive(Debug, Clone, Serialize)]
pub struct SizeStockRecord {
    pub uuid: SizeStockUuid,
    pub product_uuid: ProductUuid,
    pub size: Size,
    pub quantity: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
