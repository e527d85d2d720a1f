//! Inventory Data

use crate::domain::{
    inventory::records::{Size, SizeStockUuid},
    products::records::ProductUuid,
};

/// New Size Stock Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewSizeStock {
    pub uuid: SizeStockUuid,
    pub product_uuid: ProductUuid,
    pub size: Size,
    pub quantity: u64,
}

/// One (size, quantity) entry of a stock-definition payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeQuantity {
    pub size: Size,
    pub quantity: u64,
}
