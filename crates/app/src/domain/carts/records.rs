//! Cart Records

use jiff::Timestamp;
use serde::Serialize;

use crate::{
    domain::{
        inventory::records::{Size, SizeStockUuid},
        products::records::ProductUuid,
        sellers::records::SellerUuid,
        users::records::UserUuid,
    },
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<CartRecord>;

/// Cart Record
///
/// One cart per user. `total_value` is a cached sum of the item line
/// totals, recomputed inside every mutating transaction.
#[derive(Debug, Clone, Serialize)]
pub struct CartRecord {
    pub uuid: CartUuid,
    pub user_uuid: UserUuid,
    pub total_value: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItemRecord>;

/// Cart Item Record
#[derive(Debug, Clone, Serialize)]
pub struct CartItemRecord {
    pub uuid: CartItemUuid,
    pub cart_uuid: CartUuid,
    pub user_uuid: UserUuid,
    pub size_stock_uuid: SizeStockUuid,
    pub quantity: u64,
    pub total_price: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A cart item joined with its product and stock unit, the shape the
/// cart view and checkout work from.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub uuid: CartItemUuid,
    pub cart_uuid: CartUuid,
    pub user_uuid: UserUuid,
    pub size_stock_uuid: SizeStockUuid,
    pub quantity: u64,
    pub total_price: u64,
    pub size: Size,
    pub available: u64,
    pub product_uuid: ProductUuid,
    pub product_name: String,
    pub unit_price: u64,
    pub seller_uuid: SellerUuid,
}

/// Items of one seller within a cart, with their subtotal.
#[derive(Debug, Clone, Serialize)]
pub struct SellerGroup {
    pub seller_uuid: SellerUuid,
    pub items: Vec<CartItemView>,
    pub subtotal: u64,
}

/// One seller's slice of a cart.
#[derive(Debug, Clone, Serialize)]
pub struct SellerItems {
    pub items: Vec<CartItemView>,
    pub subtotal: u64,
}

/// Outcome of removing one seller's items from a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SellerRemoval {
    pub removed_count: u64,
    pub removed_value: u64,
}

/// Cart View
///
/// The full cart as presented to the user: items grouped by seller in
/// first-seen order. `cart` is None for users who never added an item.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub cart: Option<CartRecord>,
    pub groups: Vec<SellerGroup>,
}
