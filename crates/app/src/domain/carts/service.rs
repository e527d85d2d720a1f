//! Carts service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        carts::{
            data::NewCartItem,
            errors::CartsServiceError,
            records::{
                CartItemRecord, CartItemUuid, CartItemView, CartView, SellerGroup, SellerItems,
                SellerRemoval,
            },
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        grouping::group_by_seller,
        inventory::PgSizeStocksRepository,
        products::PgProductsRepository,
        sellers::records::SellerUuid,
        users::records::UserUuid,
    },
};

fn line_total(quantity: u64, unit_price: u64) -> Result<u64, CartsServiceError> {
    quantity
        .checked_mul(unit_price)
        .ok_or(CartsServiceError::InvalidData)
}

fn sum_totals(items: &[CartItemView]) -> Result<u64, CartsServiceError> {
    items.iter().try_fold(0u64, |acc, item| {
        acc.checked_add(item.total_price)
            .ok_or(CartsServiceError::InvalidData)
    })
}

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts: PgCartsRepository,
    items: PgCartItemsRepository,
    size_stocks: PgSizeStocksRepository,
    products: PgProductsRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts: PgCartsRepository::new(),
            items: PgCartItemsRepository::new(),
            size_stocks: PgSizeStocksRepository::new(),
            products: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn add_item(&self, item: NewCartItem) -> Result<CartItemView, CartsServiceError> {
        if item.quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let mut tx = self.db.begin().await?;

        let unit = self
            .size_stocks
            .get_unit(&mut tx, item.product_uuid, item.size)
            .await?;
        let product = self
            .products
            .get_product(&mut tx, item.product_uuid)
            .await?;
        let cart = self.carts.get_or_create_cart(&mut tx, item.user_uuid).await?;

        // The line merges with any existing entry for the same stock
        // unit, so availability is checked against the merged quantity.
        let existing = self
            .items
            .get_item_by_stock(&mut tx, cart.uuid, unit.uuid)
            .await?;
        let merged = existing
            .map_or(0, |line| line.quantity)
            .checked_add(item.quantity)
            .ok_or(CartsServiceError::InvalidData)?;

        if merged > unit.quantity {
            return Err(CartsServiceError::NotEnoughStock {
                available: unit.quantity,
            });
        }

        let added = self
            .items
            .upsert_item(
                &mut tx,
                cart.uuid,
                item.user_uuid,
                unit.uuid,
                item.quantity,
                line_total(item.quantity, product.price)?,
            )
            .await?;

        self.carts.recompute_total(&mut tx, cart.uuid).await?;

        let view = self.items.get_item_view(&mut tx, added.uuid).await?;

        tx.commit().await?;

        Ok(view)
    }

    async fn get_cart(&self, user: UserUuid) -> Result<CartView, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let Some(cart) = self.carts.get_cart_by_user(&mut tx, user).await? else {
            return Ok(CartView {
                cart: None,
                groups: vec![],
            });
        };

        let items = self.items.list_items(&mut tx, cart.uuid).await?;

        tx.commit().await?;

        let groups = group_by_seller(items, |item: &CartItemView| item.seller_uuid)
            .into_iter()
            .map(|(seller_uuid, items)| {
                Ok(SellerGroup {
                    seller_uuid,
                    subtotal: sum_totals(&items)?,
                    items,
                })
            })
            .collect::<Result<Vec<_>, CartsServiceError>>()?;

        Ok(CartView {
            cart: Some(cart),
            groups,
        })
    }

    async fn update_item_quantity(
        &self,
        user: UserUuid,
        item: CartItemUuid,
        quantity: u64,
    ) -> Result<CartItemRecord, CartsServiceError> {
        if quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let mut tx = self.db.begin().await?;

        let existing = self.items.get_item_for_user(&mut tx, item, user).await?;
        let unit = self
            .size_stocks
            .get_by_uuid(&mut tx, existing.size_stock_uuid)
            .await?;

        if quantity > unit.quantity {
            return Err(CartsServiceError::NotEnoughStock {
                available: unit.quantity,
            });
        }

        let product = self
            .products
            .get_product(&mut tx, unit.product_uuid)
            .await?;

        let updated = self
            .items
            .update_item_quantity(
                &mut tx,
                item,
                user,
                quantity,
                line_total(quantity, product.price)?,
            )
            .await?;

        self.carts
            .recompute_total(&mut tx, existing.cart_uuid)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn remove_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
    ) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let existing = self.items.get_item_for_user(&mut tx, item, user).await?;

        let deleted = self.items.delete_item(&mut tx, item, user).await?;
        if deleted == 0 {
            return Err(CartsServiceError::NotFound);
        }

        self.carts
            .recompute_total(&mut tx, existing.cart_uuid)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn remove_items_by_seller(
        &self,
        user: UserUuid,
        seller: SellerUuid,
    ) -> Result<SellerRemoval, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let Some(cart) = self.carts.get_cart_by_user(&mut tx, user).await? else {
            return Err(CartsServiceError::NotFound);
        };

        let items = self
            .items
            .list_items_by_seller(&mut tx, cart.uuid, seller)
            .await?;
        let removed_value = sum_totals(&items)?;

        let removed_count = self
            .items
            .delete_items_by_seller(&mut tx, cart.uuid, seller)
            .await?;

        self.carts.recompute_total(&mut tx, cart.uuid).await?;

        tx.commit().await?;

        Ok(SellerRemoval {
            removed_count,
            removed_value,
        })
    }

    async fn get_items_by_seller(
        &self,
        user: UserUuid,
        seller: SellerUuid,
    ) -> Result<SellerItems, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let Some(cart) = self.carts.get_cart_by_user(&mut tx, user).await? else {
            return Ok(SellerItems {
                items: vec![],
                subtotal: 0,
            });
        };

        let items = self
            .items
            .list_items_by_seller(&mut tx, cart.uuid, seller)
            .await?;

        tx.commit().await?;

        Ok(SellerItems {
            subtotal: sum_totals(&items)?,
            items,
        })
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Adds a product in one size to the user's cart, creating the cart
    /// on first use and merging into an existing line for the same
    /// stock unit.
    async fn add_item(&self, item: NewCartItem) -> Result<CartItemView, CartsServiceError>;

    /// The user's cart with items grouped by seller. Users without a
    /// cart get an empty view.
    async fn get_cart(&self, user: UserUuid) -> Result<CartView, CartsServiceError>;

    /// Sets the quantity of a cart line the user owns.
    async fn update_item_quantity(
        &self,
        user: UserUuid,
        item: CartItemUuid,
        quantity: u64,
    ) -> Result<CartItemRecord, CartsServiceError>;

    /// Removes a cart line the user owns.
    async fn remove_item(&self, user: UserUuid, item: CartItemUuid)
    -> Result<(), CartsServiceError>;

    /// Removes every line of one seller from the user's cart.
    async fn remove_items_by_seller(
        &self,
        user: UserUuid,
        seller: SellerUuid,
    ) -> Result<SellerRemoval, CartsServiceError>;

    /// The user's cart lines for one seller with their subtotal.
    async fn get_items_by_seller(
        &self,
        user: UserUuid,
        seller: SellerUuid,
    ) -> Result<SellerItems, CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::inventory::records::Size,
        test::{TestContext, helpers},
    };

    use super::*;

    #[tokio::test]
    async fn add_item_creates_cart_and_line() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = helpers::create_user(&ctx).await?;
        let seller = helpers::create_seller(&ctx).await?;
        let product = helpers::create_product(&ctx, seller.uuid, 1200, &[(Size::M, 10)]).await?;

        let item = ctx
            .carts
            .add_item(NewCartItem {
                user_uuid: buyer.uuid,
                product_uuid: product.uuid,
                size: Size::M,
                quantity: 2,
            })
            .await?;

        assert_eq!(item.user_uuid, buyer.uuid);
        assert_eq!(item.quantity, 2);
        assert_eq!(item.total_price, 2400);
        assert_eq!(item.product_uuid, product.uuid);
        assert_eq!(item.size, Size::M);
        assert_eq!(item.seller_uuid, seller.uuid);

        let view = ctx.carts.get_cart(buyer.uuid).await?;
        let cart = view.cart.ok_or("expected a cart")?;
        assert_eq!(cart.total_value, 2400);
        assert_eq!(view.groups.len(), 1);
        assert_eq!(view.groups[0].seller_uuid, seller.uuid);
        assert_eq!(view.groups[0].subtotal, 2400);

        Ok(())
    }

    #[tokio::test]
    async fn add_item_same_unit_merges_into_one_line() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = helpers::create_user(&ctx).await?;
        let seller = helpers::create_seller(&ctx).await?;
        let product = helpers::create_product(&ctx, seller.uuid, 500, &[(Size::L, 10)]).await?;

        let first = helpers::add_item(&ctx, buyer.uuid, product.uuid, Size::L, 2).await?;
        let second = helpers::add_item(&ctx, buyer.uuid, product.uuid, Size::L, 3).await?;

        assert_eq!(second.uuid, first.uuid);
        assert_eq!(second.quantity, 5);
        assert_eq!(second.total_price, 2500);

        let view = ctx.carts.get_cart(buyer.uuid).await?;
        assert_eq!(view.groups[0].items.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn add_item_zero_quantity_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = helpers::create_user(&ctx).await?;
        let seller = helpers::create_seller(&ctx).await?;
        let product = helpers::create_product(&ctx, seller.uuid, 500, &[(Size::S, 5)]).await?;

        let result = ctx
            .carts
            .add_item(NewCartItem {
                user_uuid: buyer.uuid,
                product_uuid: product.uuid,
                size: Size::S,
                quantity: 0,
            })
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::InvalidQuantity)),
            "expected InvalidQuantity, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn add_item_unstocked_size_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = helpers::create_user(&ctx).await?;
        let seller = helpers::create_seller(&ctx).await?;
        let product = helpers::create_product(&ctx, seller.uuid, 500, &[(Size::S, 5)]).await?;

        let result = ctx
            .carts
            .add_item(NewCartItem {
                user_uuid: buyer.uuid,
                product_uuid: product.uuid,
                size: Size::Xxl,
                quantity: 1,
            })
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn add_item_beyond_stock_reports_availability() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = helpers::create_user(&ctx).await?;
        let seller = helpers::create_seller(&ctx).await?;
        let product = helpers::create_product(&ctx, seller.uuid, 500, &[(Size::S, 3)]).await?;

        let result = ctx
            .carts
            .add_item(NewCartItem {
                user_uuid: buyer.uuid,
                product_uuid: product.uuid,
                size: Size::S,
                quantity: 4,
            })
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::NotEnoughStock { available: 3 })),
            "expected NotEnoughStock, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn merged_line_cannot_exceed_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = helpers::create_user(&ctx).await?;
        let seller = helpers::create_seller(&ctx).await?;
        let product = helpers::create_product(&ctx, seller.uuid, 500, &[(Size::S, 3)]).await?;

        helpers::add_item(&ctx, buyer.uuid, product.uuid, Size::S, 2).await?;

        let result = ctx
            .carts
            .add_item(NewCartItem {
                user_uuid: buyer.uuid,
                product_uuid: product.uuid,
                size: Size::S,
                quantity: 2,
            })
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::NotEnoughStock { available: 3 })),
            "expected NotEnoughStock, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn merged_quantity_overflow_is_invalid_data() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = helpers::create_user(&ctx).await?;
        let seller = helpers::create_seller(&ctx).await?;
        let product = helpers::create_product(&ctx, seller.uuid, 500, &[(Size::S, 3)]).await?;

        helpers::add_item(&ctx, buyer.uuid, product.uuid, Size::S, 1).await?;

        let result = ctx
            .carts
            .add_item(NewCartItem {
                user_uuid: buyer.uuid,
                product_uuid: product.uuid,
                size: Size::S,
                quantity: u64::MAX,
            })
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn get_cart_groups_items_by_seller_in_first_seen_order() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = helpers::create_user(&ctx).await?;
        let first = helpers::create_seller(&ctx).await?;
        let second = helpers::create_seller(&ctx).await?;

        let shirt = helpers::create_product(&ctx, first.uuid, 1000, &[(Size::M, 5)]).await?;
        let jacket = helpers::create_product(&ctx, second.uuid, 4000, &[(Size::M, 5)]).await?;
        let cap = helpers::create_product(&ctx, first.uuid, 700, &[(Size::S, 5)]).await?;

        helpers::add_item(&ctx, buyer.uuid, shirt.uuid, Size::M, 1).await?;
        helpers::add_item(&ctx, buyer.uuid, jacket.uuid, Size::M, 1).await?;
        helpers::add_item(&ctx, buyer.uuid, cap.uuid, Size::S, 1).await?;

        let view = ctx.carts.get_cart(buyer.uuid).await?;

        assert_eq!(view.groups.len(), 2);
        assert_eq!(view.groups[0].seller_uuid, first.uuid);
        assert_eq!(view.groups[0].items.len(), 2);
        assert_eq!(view.groups[0].subtotal, 1700);
        assert_eq!(view.groups[1].seller_uuid, second.uuid);
        assert_eq!(view.groups[1].items.len(), 1);
        assert_eq!(view.groups[1].subtotal, 4000);

        let cart = view.cart.ok_or("expected a cart")?;
        assert_eq!(cart.total_value, 5700);

        Ok(())
    }

    #[tokio::test]
    async fn get_cart_without_cart_returns_empty_view() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = helpers::create_user(&ctx).await?;

        let view = ctx.carts.get_cart(buyer.uuid).await?;

        assert!(view.cart.is_none());
        assert!(view.groups.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn update_item_quantity_reprices_the_line() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = helpers::create_user(&ctx).await?;
        let seller = helpers::create_seller(&ctx).await?;
        let product = helpers::create_product(&ctx, seller.uuid, 900, &[(Size::M, 10)]).await?;
        let item = helpers::add_item(&ctx, buyer.uuid, product.uuid, Size::M, 1).await?;

        let updated = ctx
            .carts
            .update_item_quantity(buyer.uuid, item.uuid, 4)
            .await?;

        assert_eq!(updated.quantity, 4);
        assert_eq!(updated.total_price, 3600);

        let view = ctx.carts.get_cart(buyer.uuid).await?;
        assert_eq!(view.cart.ok_or("expected a cart")?.total_value, 3600);

        Ok(())
    }

    #[tokio::test]
    async fn update_item_quantity_by_other_user_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = helpers::create_user(&ctx).await?;
        let intruder = helpers::create_user(&ctx).await?;
        let seller = helpers::create_seller(&ctx).await?;
        let product = helpers::create_product(&ctx, seller.uuid, 900, &[(Size::M, 10)]).await?;
        let item = helpers::add_item(&ctx, buyer.uuid, product.uuid, Size::M, 1).await?;

        let result = ctx
            .carts
            .update_item_quantity(intruder.uuid, item.uuid, 2)
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn remove_item_updates_cart_total() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = helpers::create_user(&ctx).await?;
        let seller = helpers::create_seller(&ctx).await?;
        let shirt = helpers::create_product(&ctx, seller.uuid, 1000, &[(Size::M, 5)]).await?;
        let cap = helpers::create_product(&ctx, seller.uuid, 700, &[(Size::S, 5)]).await?;

        let shirt_item = helpers::add_item(&ctx, buyer.uuid, shirt.uuid, Size::M, 1).await?;
        helpers::add_item(&ctx, buyer.uuid, cap.uuid, Size::S, 1).await?;

        ctx.carts.remove_item(buyer.uuid, shirt_item.uuid).await?;

        let view = ctx.carts.get_cart(buyer.uuid).await?;
        assert_eq!(view.cart.ok_or("expected a cart")?.total_value, 700);
        assert_eq!(view.groups[0].items.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn remove_items_by_seller_clears_only_that_seller() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = helpers::create_user(&ctx).await?;
        let first = helpers::create_seller(&ctx).await?;
        let second = helpers::create_seller(&ctx).await?;
        let shirt = helpers::create_product(&ctx, first.uuid, 1000, &[(Size::M, 5)]).await?;
        let jacket = helpers::create_product(&ctx, second.uuid, 4000, &[(Size::M, 5)]).await?;

        helpers::add_item(&ctx, buyer.uuid, shirt.uuid, Size::M, 2).await?;
        helpers::add_item(&ctx, buyer.uuid, jacket.uuid, Size::M, 1).await?;

        let removal = ctx
            .carts
            .remove_items_by_seller(buyer.uuid, first.uuid)
            .await?;
        assert_eq!(
            removal,
            SellerRemoval {
                removed_count: 1,
                removed_value: 2000,
            }
        );

        let view = ctx.carts.get_cart(buyer.uuid).await?;
        assert_eq!(view.groups.len(), 1);
        assert_eq!(view.groups[0].seller_uuid, second.uuid);
        assert_eq!(view.cart.ok_or("expected a cart")?.total_value, 4000);

        Ok(())
    }

    #[tokio::test]
    async fn remove_items_by_seller_without_cart_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = helpers::create_user(&ctx).await?;
        let seller = helpers::create_seller(&ctx).await?;

        let result = ctx
            .carts
            .remove_items_by_seller(buyer.uuid, seller.uuid)
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn get_items_by_seller_filters_the_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = helpers::create_user(&ctx).await?;
        let first = helpers::create_seller(&ctx).await?;
        let second = helpers::create_seller(&ctx).await?;
        let shirt = helpers::create_product(&ctx, first.uuid, 1000, &[(Size::M, 5)]).await?;
        let jacket = helpers::create_product(&ctx, second.uuid, 4000, &[(Size::M, 5)]).await?;

        helpers::add_item(&ctx, buyer.uuid, shirt.uuid, Size::M, 2).await?;
        helpers::add_item(&ctx, buyer.uuid, jacket.uuid, Size::M, 1).await?;

        let group = ctx
            .carts
            .get_items_by_seller(buyer.uuid, first.uuid)
            .await?;

        assert_eq!(group.items.len(), 1);
        assert_eq!(group.items[0].seller_uuid, first.uuid);
        assert_eq!(group.items[0].product_name, shirt.name);
        assert_eq!(group.subtotal, 2000);

        Ok(())
    }
}
