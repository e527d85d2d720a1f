//! Cart Data

use crate::domain::{
    inventory::records::Size, products::records::ProductUuid, users::records::UserUuid,
};

/// New Cart Item Data
///
/// Adding the same product and size twice merges into the existing
/// line.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartItem {
    pub user_uuid: UserUuid,
    pub product_uuid: ProductUuid,
    pub size: Size,
    pub quantity: u64,
}
