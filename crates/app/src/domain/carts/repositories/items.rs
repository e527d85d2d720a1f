//! Cart Items Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::domain::{
    carts::records::{CartItemRecord, CartItemUuid, CartItemView, CartUuid},
    inventory::{amount_to_db, records::SizeStockUuid, try_get_amount, try_get_size},
    products::records::ProductUuid,
    sellers::records::SellerUuid,
    users::records::UserUuid,
};

const LIST_CART_ITEMS_SQL: &str = include_str!("../sql/list_cart_items.sql");
const LIST_CART_ITEMS_BY_SELLER_SQL: &str = include_str!("../sql/list_cart_items_by_seller.sql");
const GET_CART_ITEM_VIEW_SQL: &str = include_str!("../sql/get_cart_item_view.sql");
const GET_CART_ITEM_FOR_USER_SQL: &str = include_str!("../sql/get_cart_item_for_user.sql");
const GET_CART_ITEM_BY_STOCK_SQL: &str = include_str!("../sql/get_cart_item_by_stock.sql");
const UPSERT_CART_ITEM_SQL: &str = include_str!("../sql/upsert_cart_item.sql");
const UPDATE_CART_ITEM_QUANTITY_SQL: &str = include_str!("../sql/update_cart_item_quantity.sql");
const DELETE_CART_ITEM_SQL: &str = include_str!("../sql/delete_cart_item.sql");
const DELETE_CART_ITEMS_BY_SELLER_SQL: &str =
    include_str!("../sql/delete_cart_items_by_seller.sql");
const DELETE_CART_ITEMS_BY_UUIDS_SQL: &str = include_str!("../sql/delete_cart_items_by_uuids.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartItemsRepository;

impl PgCartItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Vec<CartItemView>, sqlx::Error> {
        query_as::<Postgres, CartItemView>(LIST_CART_ITEMS_SQL)
            .bind(cart.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_items_by_seller(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        seller: SellerUuid,
    ) -> Result<Vec<CartItemView>, sqlx::Error> {
        query_as::<Postgres, CartItemView>(LIST_CART_ITEMS_BY_SELLER_SQL)
            .bind(cart.into_uuid())
            .bind(seller.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// The joined display shape of a single line.
    pub(crate) async fn get_item_view(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: CartItemUuid,
    ) -> Result<CartItemView, sqlx::Error> {
        query_as::<Postgres, CartItemView>(GET_CART_ITEM_VIEW_SQL)
            .bind(item.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_item_for_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: CartItemUuid,
        user: UserUuid,
    ) -> Result<CartItemRecord, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(GET_CART_ITEM_FOR_USER_SQL)
            .bind(item.into_uuid())
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_item_by_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        size_stock: SizeStockUuid,
    ) -> Result<Option<CartItemRecord>, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(GET_CART_ITEM_BY_STOCK_SQL)
            .bind(cart.into_uuid())
            .bind(size_stock.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Inserts a line or merges into the existing line for the same
    /// stock unit, adding quantities and line totals.
    pub(crate) async fn upsert_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        user: UserUuid,
        size_stock: SizeStockUuid,
        quantity: u64,
        total_price: u64,
    ) -> Result<CartItemRecord, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(UPSERT_CART_ITEM_SQL)
            .bind(CartItemUuid::new().into_uuid())
            .bind(cart.into_uuid())
            .bind(user.into_uuid())
            .bind(size_stock.into_uuid())
            .bind(amount_to_db(quantity)?)
            .bind(amount_to_db(total_price)?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_item_quantity(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: CartItemUuid,
        user: UserUuid,
        quantity: u64,
        total_price: u64,
    ) -> Result<CartItemRecord, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(UPDATE_CART_ITEM_QUANTITY_SQL)
            .bind(item.into_uuid())
            .bind(user.into_uuid())
            .bind(amount_to_db(quantity)?)
            .bind(amount_to_db(total_price)?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        item: CartItemUuid,
        user: UserUuid,
    ) -> Result<u64, sqlx::Error> {
        let result = query(DELETE_CART_ITEM_SQL)
            .bind(item.into_uuid())
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }

    pub(crate) async fn delete_items_by_seller(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        seller: SellerUuid,
    ) -> Result<u64, sqlx::Error> {
        let result = query(DELETE_CART_ITEMS_BY_SELLER_SQL)
            .bind(cart.into_uuid())
            .bind(seller.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }

    pub(crate) async fn delete_items_by_uuids(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        items: &[CartItemUuid],
        cart: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let uuids: Vec<Uuid> = items.iter().map(|item| item.into_uuid()).collect();

        let result = query(DELETE_CART_ITEMS_BY_UUIDS_SQL)
            .bind(uuids)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }
}

impl<'r> FromRow<'r, PgRow> for CartItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CartItemUuid::from_uuid(row.try_get("uuid")?),
            cart_uuid: CartUuid::from_uuid(row.try_get("cart_uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            size_stock_uuid: SizeStockUuid::from_uuid(row.try_get("size_stock_uuid")?),
            quantity: try_get_amount(row, "quantity")?,
            total_price: try_get_amount(row, "total_price")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CartItemView {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CartItemUuid::from_uuid(row.try_get("uuid")?),
            cart_uuid: CartUuid::from_uuid(row.try_get("cart_uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            size_stock_uuid: SizeStockUuid::from_uuid(row.try_get("size_stock_uuid")?),
            quantity: try_get_amount(row, "quantity")?,
            total_price: try_get_amount(row, "total_price")?,
            size: try_get_size(row, "size")?,
            available: try_get_amount(row, "available")?,
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            product_name: row.try_get("product_name")?,
            unit_price: try_get_amount(row, "unit_price")?,
            seller_uuid: SellerUuid::from_uuid(row.try_get("seller_uuid")?),
        })
    }
}
