//! Product Records

use jiff::Timestamp;
use serde::Serialize;

use crate::{
    domain::{inventory::records::SizeStockRecord, sellers::records::SellerUuid},
    uuids::TypedUuid,
};

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
///
/// `price` is the unit price in minor currency units.
#[derive(Debug, Clone, Serialize)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub seller_uuid: SellerUuid,
    pub name: String,
    pub price: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A product together with its per-size stock units.
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithStocks {
    pub product: ProductRecord,
    pub stocks: Vec<SizeStockRecord>,
}
