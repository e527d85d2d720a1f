//! Orders service.
//!
//! Checkout decrements stock, writes the order rows and clears the
//! purchased cart lines inside one transaction. Notifications go out
//! after the commit and never fail the order.

use std::collections::HashMap;

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        carts::{PgCartItemsRepository, PgCartsRepository, records::CartItemView},
        grouping::group_by_seller,
        inventory::PgSizeStocksRepository,
        notifications::{NotificationsService, PgNotificationsService},
        orders::{
            data::{CartCheckout, NewOrder, UpdateOrder},
            errors::OrdersServiceError,
            records::{
                OrderDetails, OrderItemView, OrderRecord, OrderStatus, OrderUuid, ShipmentRecord,
            },
            repositories::{PgOrderItemsRepository, PgOrdersRepository, PgShipmentsRepository},
        },
        products::PgProductsRepository,
        sellers::{PgSellersRepository, records::SellerUuid},
        users::records::UserUuid,
    },
};

fn line_total(quantity: u64, unit_price: u64) -> Result<u64, OrdersServiceError> {
    quantity
        .checked_mul(unit_price)
        .ok_or(OrdersServiceError::InvalidData)
}

fn add_total(total: u64, line: u64) -> Result<u64, OrdersServiceError> {
    total
        .checked_add(line)
        .ok_or(OrdersServiceError::InvalidData)
}

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    orders: PgOrdersRepository,
    items: PgOrderItemsRepository,
    shipments: PgShipmentsRepository,
    size_stocks: PgSizeStocksRepository,
    products: PgProductsRepository,
    carts: PgCartsRepository,
    cart_items: PgCartItemsRepository,
    sellers: PgSellersRepository,
    notifications: PgNotificationsService,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        let notifications = PgNotificationsService::new(db.clone());

        Self {
            db,
            orders: PgOrdersRepository::new(),
            items: PgOrderItemsRepository::new(),
            shipments: PgShipmentsRepository::new(),
            size_stocks: PgSizeStocksRepository::new(),
            products: PgProductsRepository::new(),
            carts: PgCartsRepository::new(),
            cart_items: PgCartItemsRepository::new(),
            sellers: PgSellersRepository::new(),
            notifications,
        }
    }

    async fn notify_user(&self, user: UserUuid, message: &str) {
        if let Err(error) = self.notifications.notify(user, message).await {
            warn!(%user, %error, "failed to deliver notification");
        }
    }

    /// Attaches lines and shipments to a batch of orders with two
    /// queries, preserving the input order.
    async fn load_details(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: Vec<OrderRecord>,
    ) -> Result<Vec<OrderDetails>, OrdersServiceError> {
        let uuids: Vec<OrderUuid> = orders.iter().map(|order| order.uuid).collect();

        let views = self.items.list_views_for_orders(tx, &uuids).await?;
        let shipments = self.shipments.list_for_orders(tx, &uuids).await?;

        let mut items_by_order: HashMap<OrderUuid, Vec<OrderItemView>> = HashMap::new();
        for view in views {
            items_by_order.entry(view.order_uuid).or_default().push(view);
        }

        let mut shipments_by_order: HashMap<OrderUuid, ShipmentRecord> = shipments
            .into_iter()
            .map(|shipment| (shipment.order_uuid, shipment))
            .collect();

        Ok(orders
            .into_iter()
            .map(|order| OrderDetails {
                items: items_by_order.remove(&order.uuid).unwrap_or_default(),
                shipment: shipments_by_order.remove(&order.uuid),
                order,
            })
            .collect())
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn create_order(&self, order: NewOrder) -> Result<OrderDetails, OrdersServiceError> {
        if order.items.is_empty() {
            return Err(OrdersServiceError::EmptyOrder);
        }
        if order.items.iter().any(|item| item.quantity == 0) {
            return Err(OrdersServiceError::InvalidQuantity);
        }

        let mut tx = self.db.begin().await?;

        let mut total = 0u64;
        let mut lines = Vec::with_capacity(order.items.len());

        for item in &order.items {
            let unit = self
                .size_stocks
                .get_by_uuid(&mut tx, item.size_stock_uuid)
                .await?;
            let product = self
                .products
                .get_product(&mut tx, unit.product_uuid)
                .await?;

            if product.seller_uuid != order.seller_uuid {
                return Err(OrdersServiceError::InvalidReference);
            }

            let decremented = self
                .size_stocks
                .decrement(&mut tx, unit.uuid, item.quantity)
                .await?;
            if !decremented {
                return Err(OrdersServiceError::NotEnoughStock {
                    available: unit.quantity,
                });
            }

            let line = line_total(item.quantity, item.price)?;
            total = add_total(total, line)?;
            lines.push((unit.uuid, item.quantity, line));
        }

        let created = self
            .orders
            .create_order(
                &mut tx,
                order.uuid,
                order.user_uuid,
                order.seller_uuid,
                &order.delivery,
                total,
            )
            .await?;

        for (size_stock, quantity, line) in lines {
            self.items
                .create_item(&mut tx, created.uuid, size_stock, quantity, line)
                .await?;
        }

        self.shipments.create_shipment(&mut tx, created.uuid).await?;

        let seller = self.sellers.get_seller(&mut tx, order.seller_uuid).await?;

        let mut details = self.load_details(&mut tx, vec![created]).await?;

        tx.commit().await?;

        let Some(details) = details.pop() else {
            return Err(OrdersServiceError::NotFound);
        };

        info!(order = %details.order.uuid, total = details.order.total_price, "order placed");

        self.notify_user(seller.user_uuid, "You have received a new order")
            .await;
        self.notify_user(order.user_uuid, "Your order has been placed")
            .await;

        Ok(details)
    }

    async fn create_from_cart(
        &self,
        checkout: CartCheckout,
    ) -> Result<Vec<OrderDetails>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self
            .carts
            .get_cart(&mut tx, checkout.cart_uuid)
            .await?
            .filter(|cart| cart.user_uuid == checkout.user_uuid)
            .ok_or(OrdersServiceError::NotFound)?;

        let all_items = self.cart_items.list_items(&mut tx, cart.uuid).await?;
        if all_items.is_empty() {
            return Err(OrdersServiceError::NotFound);
        }

        // An empty selection checks out the whole cart.
        let selected: Vec<CartItemView> = if checkout.selected_items.is_empty() {
            all_items
        } else {
            all_items
                .into_iter()
                .filter(|view| checkout.selected_items.contains(&view.uuid))
                .collect()
        };
        if selected.is_empty() {
            return Err(OrdersServiceError::NotFound);
        }

        let consumed: Vec<_> = selected.iter().map(|view| view.uuid).collect();
        let groups = group_by_seller(selected, |view: &CartItemView| view.seller_uuid);

        let mut created = Vec::with_capacity(groups.len());
        let mut seller_uuids = Vec::with_capacity(groups.len());

        for (seller_uuid, items) in groups {
            let mut total = 0u64;

            for view in &items {
                let decremented = self
                    .size_stocks
                    .decrement(&mut tx, view.size_stock_uuid, view.quantity)
                    .await?;
                if !decremented {
                    let unit = self
                        .size_stocks
                        .get_by_uuid(&mut tx, view.size_stock_uuid)
                        .await?;
                    return Err(OrdersServiceError::NotEnoughStock {
                        available: unit.quantity,
                    });
                }

                total = add_total(total, view.total_price)?;
            }

            let order = self
                .orders
                .create_order(
                    &mut tx,
                    OrderUuid::new(),
                    checkout.user_uuid,
                    seller_uuid,
                    &checkout.delivery,
                    total,
                )
                .await?;

            for view in &items {
                self.items
                    .create_item(
                        &mut tx,
                        order.uuid,
                        view.size_stock_uuid,
                        view.quantity,
                        view.total_price,
                    )
                    .await?;
            }

            self.shipments.create_shipment(&mut tx, order.uuid).await?;

            seller_uuids.push(seller_uuid);
            created.push(order);
        }

        self.cart_items
            .delete_items_by_uuids(&mut tx, &consumed, cart.uuid)
            .await?;
        self.carts.recompute_total(&mut tx, cart.uuid).await?;

        let recipients = self.sellers.list_seller_users(&mut tx, &seller_uuids).await?;

        let details = self.load_details(&mut tx, created).await?;

        tx.commit().await?;

        info!(
            user = %checkout.user_uuid,
            orders = details.len(),
            "cart checkout completed"
        );

        for (_, user) in recipients {
            self.notify_user(user, "You have received a new order").await;
        }

        let message = if details.len() > 1 {
            "Your orders have been placed"
        } else {
            "Your order has been placed"
        };
        self.notify_user(checkout.user_uuid, message).await;

        Ok(details)
    }

    async fn update_order(
        &self,
        order: OrderUuid,
        update: UpdateOrder,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.orders.get_order(&mut tx, order).await?;

        let status_changed = update.status.is_some_and(|next| next != current.status);

        if let Some(next) = update.status
            && status_changed
            && !current.status.can_transition_to(next)
        {
            return Err(OrdersServiceError::InvalidTransition {
                from: current.status,
                to: next,
            });
        }

        let updated = self.orders.update_order(&mut tx, order, &update).await?;

        // The shipment tracks its own status; it only moves when its
        // fields are supplied explicitly.
        if update.shipment_status.is_some() || update.delivery_date.is_some() {
            self.shipments
                .update_shipment(
                    &mut tx,
                    order,
                    update.shipment_status.as_deref(),
                    update.delivery_date,
                )
                .await?;
        }

        tx.commit().await?;

        if status_changed {
            info!(order = %updated.uuid, status = updated.status.as_str(), "order status changed");

            let message = match updated.status {
                OrderStatus::Shipped => Some("Your order has been shipped"),
                OrderStatus::Delivered => Some("Your order has been delivered"),
                OrderStatus::Cancelled => Some("Your order has been cancelled"),
                OrderStatus::Pending => None,
            };
            if let Some(message) = message {
                self.notify_user(updated.user_uuid, message).await;
            }
        }

        Ok(updated)
    }

    async fn cancel_order(
        &self,
        order: OrderUuid,
        reason: Option<String>,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.orders.get_order(&mut tx, order).await?;

        if !current.status.can_transition_to(OrderStatus::Cancelled) {
            return Err(OrdersServiceError::InvalidTransition {
                from: current.status,
                to: OrderStatus::Cancelled,
            });
        }

        let cancelled = self
            .orders
            .cancel_order(&mut tx, order, reason.as_deref())
            .await?;

        tx.commit().await?;

        info!(order = %cancelled.uuid, "order cancelled");

        self.notify_user(cancelled.user_uuid, "Your order has been cancelled")
            .await;

        Ok(cancelled)
    }

    async fn delete_order(&self, order: OrderUuid) -> Result<(), OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        self.items.delete_for_order(&mut tx, order).await?;
        self.shipments.delete_for_order(&mut tx, order).await?;

        let deleted = self.orders.delete_order(&mut tx, order).await?;
        if deleted == 0 {
            return Err(OrdersServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn get_order(&self, order: OrderUuid) -> Result<OrderDetails, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.orders.get_order(&mut tx, order).await?;
        let mut details = self.load_details(&mut tx, vec![record]).await?;

        tx.commit().await?;

        details.pop().ok_or(OrdersServiceError::NotFound)
    }

    async fn list_by_user(&self, user: UserUuid) -> Result<Vec<OrderDetails>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let orders = self.orders.list_for_user(&mut tx, user).await?;
        let details = self.load_details(&mut tx, orders).await?;

        tx.commit().await?;

        Ok(details)
    }

    async fn list_by_seller(
        &self,
        seller: SellerUuid,
    ) -> Result<Vec<OrderDetails>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let orders = self.orders.list_for_seller(&mut tx, seller).await?;
        let details = self.load_details(&mut tx, orders).await?;

        tx.commit().await?;

        Ok(details)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Places a direct order against one seller, decrementing stock for
    /// every line. Lines are priced by the caller.
    async fn create_order(&self, order: NewOrder) -> Result<OrderDetails, OrdersServiceError>;

    /// Converts cart lines into orders, one per seller, and removes
    /// them from the cart. All or nothing across sellers. An empty
    /// selection checks out the whole cart.
    async fn create_from_cart(
        &self,
        checkout: CartCheckout,
    ) -> Result<Vec<OrderDetails>, OrdersServiceError>;

    /// Updates status, payment status, cancellation reason, delivery
    /// date or shipment status. Status changes must follow the
    /// fulfilment state machine.
    async fn update_order(
        &self,
        order: OrderUuid,
        update: UpdateOrder,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Cancels an order, recording the reason. Stock is not returned.
    async fn cancel_order(
        &self,
        order: OrderUuid,
        reason: Option<String>,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Removes an order, its lines and its shipment outright.
    async fn delete_order(&self, order: OrderUuid) -> Result<(), OrdersServiceError>;

    /// An order with its lines and shipment.
    async fn get_order(&self, order: OrderUuid) -> Result<OrderDetails, OrdersServiceError>;

    /// The user's orders with their lines and shipments, newest first.
    async fn list_by_user(&self, user: UserUuid) -> Result<Vec<OrderDetails>, OrdersServiceError>;

    /// The seller's orders with their lines and shipments, newest
    /// first.
    async fn list_by_seller(
        &self,
        seller: SellerUuid,
    ) -> Result<Vec<OrderDetails>, OrdersServiceError>;
}
