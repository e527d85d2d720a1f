//! Product Data

use crate::domain::{
    inventory::data::SizeQuantity, products::records::ProductUuid, sellers::records::SellerUuid,
};

/// New Product Data
///
/// `stocks` defines the initial per-size inventory. Sizes must not
/// repeat within one payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub seller_uuid: SellerUuid,
    pub name: String,
    pub price: u64,
    pub stocks: Vec<SizeQuantity>,
}
