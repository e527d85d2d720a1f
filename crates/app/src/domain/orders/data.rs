//! Order Data

use jiff::Timestamp;

use crate::domain::{
    carts::records::{CartItemUuid, CartUuid},
    inventory::records::SizeStockUuid,
    orders::records::{OrderStatus, OrderUuid, PaymentMethod, PaymentStatus},
    sellers::records::SellerUuid,
    users::records::UserUuid,
};

/// Delivery and payment details shared by both checkout paths.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryDetails {
    pub phone_number: String,
    pub address: String,
    pub postal_code: Option<String>,
    pub payment_method: PaymentMethod,
}

/// One requested line of a direct order, priced by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewOrderItem {
    pub size_stock_uuid: SizeStockUuid,
    pub quantity: u64,
    pub price: u64,
}

/// New Order Data
///
/// A direct order against a single seller.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub user_uuid: UserUuid,
    pub seller_uuid: SellerUuid,
    pub delivery: DeliveryDetails,
    pub items: Vec<NewOrderItem>,
}

/// Cart Checkout Data
///
/// Converts cart lines into orders, one per seller. An empty selection
/// checks out the whole cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartCheckout {
    pub cart_uuid: CartUuid,
    pub user_uuid: UserUuid,
    pub delivery: DeliveryDetails,
    pub selected_items: Vec<CartItemUuid>,
}

/// Update Order Data
///
/// Absent fields keep their stored values. Shipment fields apply to the
/// order's shipment row in the same transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOrder {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub cancel_reason: Option<String>,
    pub delivery_date: Option<Timestamp>,
    pub shipment_status: Option<String>,
}
