//! Order Records

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        inventory::records::{Size, SizeStockUuid},
        products::records::ProductUuid,
        sellers::records::SellerUuid,
        users::records::UserUuid,
    },
    uuids::TypedUuid,
};

/// Order fulfilment status.
///
/// Orders move forward through PENDING, SHIPPED and DELIVERED, and may
/// be cancelled at any point before delivery. DELIVERED and CANCELLED
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// The value stored in the `status` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Parses a stored column value back into a status.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(OrderStatus::Pending),
            "SHIPPED" => Some(OrderStatus::Shipped),
            "DELIVERED" => Some(OrderStatus::Delivered),
            "CANCELLED" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Whether an order in this status may move to `next`.
    #[must_use]
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Shipped)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Shipped, OrderStatus::Delivered)
                | (OrderStatus::Shipped, OrderStatus::Cancelled)
        )
    }
}

/// Payment settlement status. Set to SUCCESS by the payment callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Success,
}

impl PaymentStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Success => "SUCCESS",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(PaymentStatus::Pending),
            "SUCCESS" => Some(PaymentStatus::Success),
            _ => None,
        }
    }
}

/// How the order is paid. COD until a payment URL is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Cod,
    Vnpay,
}

impl PaymentMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cod => "COD",
            PaymentMethod::Vnpay => "VNPAY",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "COD" => Some(PaymentMethod::Cod),
            "VNPAY" => Some(PaymentMethod::Vnpay),
            _ => None,
        }
    }
}

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Record
///
/// One order per seller. `total_price` is the sum of the item line
/// totals in minor currency units.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub user_uuid: UserUuid,
    pub seller_uuid: SellerUuid,
    pub phone_number: String,
    pub address: String,
    pub postal_code: Option<String>,
    pub payment_method: PaymentMethod,
    pub total_price: u64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub cancel_reason: Option<String>,
    pub delivery_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItemRecord>;

/// Order Item Record
///
/// A line frozen at checkout time. The stock unit reference is kept for
/// traceability; prices never change after the order is placed.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemRecord {
    pub uuid: OrderItemUuid,
    pub order_uuid: OrderUuid,
    pub size_stock_uuid: SizeStockUuid,
    pub quantity: u64,
    pub total_price: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An order line joined with its size and product, the shape order
/// reads present.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemView {
    pub uuid: OrderItemUuid,
    pub order_uuid: OrderUuid,
    pub size_stock_uuid: SizeStockUuid,
    pub quantity: u64,
    pub total_price: u64,
    pub size: Size,
    pub product_uuid: ProductUuid,
    pub product_name: String,
}

/// Shipment UUID
pub type ShipmentUuid = TypedUuid<ShipmentRecord>;

/// Shipment Record
///
/// One shipment per order, created alongside it and kept in step with
/// the order status.
#[derive(Debug, Clone, Serialize)]
pub struct ShipmentRecord {
    pub uuid: ShipmentUuid,
    pub order_uuid: OrderUuid,
    pub status: String,
    pub delivery_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An order with its lines and shipment.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    pub order: OrderRecord,
    pub items: Vec<OrderItemView>,
    pub shipment: Option<ShipmentRecord>,
}
