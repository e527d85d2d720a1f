//! Size Stocks Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::{
    inventory::{
        data::NewSizeStock,
        records::{Size, SizeStockRecord, SizeStockUuid},
    },
    products::records::ProductUuid,
};

const GET_SIZE_STOCK_SQL: &str = include_str!("sql/get_size_stock.sql");
const GET_SIZE_STOCK_BY_UUID_SQL: &str = include_str!("sql/get_size_stock_by_uuid.sql");
const LIST_SIZE_STOCKS_FOR_PRODUCT_SQL: &str = include_str!("sql/list_size_stocks_for_product.sql");
const CREATE_SIZE_STOCK_SQL: &str = include_str!("sql/create_size_stock.sql");
const DECREMENT_SIZE_STOCK_SQL: &str = include_str!("sql/decrement_size_stock.sql");

/// Decodes a non-negative BIGINT column into a u64.
pub(crate) fn try_get_amount(row: &PgRow, column: &str) -> Result<u64, sqlx::Error> {
    let raw: i64 = row.try_get(column)?;

    u64::try_from(raw).map_err(|source| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    })
}

/// Converts a u64 amount to the BIGINT representation used in storage.
pub(crate) fn amount_to_db(amount: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(amount).map_err(|source| sqlx::Error::Encode(Box::new(source)))
}

/// Decodes a `size` TEXT column into a [`Size`].
pub(crate) fn try_get_size(row: &PgRow, column: &str) -> Result<Size, sqlx::Error> {
    let raw: String = row.try_get(column)?;

    Size::parse(&raw).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: format!("unrecognised size {raw:?}").into(),
    })
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgSizeStocksRepository;

impl PgSizeStocksRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_unit(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        size: Size,
    ) -> Result<SizeStockRecord, sqlx::Error> {
        query_as::<Postgres, SizeStockRecord>(GET_SIZE_STOCK_SQL)
            .bind(product.into_uuid())
            .bind(size.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_by_uuid(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        size_stock: SizeStockUuid,
    ) -> Result<SizeStockRecord, sqlx::Error> {
        query_as::<Postgres, SizeStockRecord>(GET_SIZE_STOCK_BY_UUID_SQL)
            .bind(size_stock.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_for_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Vec<SizeStockRecord>, sqlx::Error> {
        query_as::<Postgres, SizeStockRecord>(LIST_SIZE_STOCKS_FOR_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn create_size_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        stock: NewSizeStock,
    ) -> Result<SizeStockRecord, sqlx::Error> {
        query_as::<Postgres, SizeStockRecord>(CREATE_SIZE_STOCK_SQL)
            .bind(stock.uuid.into_uuid())
            .bind(stock.product_uuid.into_uuid())
            .bind(stock.size.as_str())
            .bind(amount_to_db(stock.quantity)?)
            .fetch_one(&mut **tx)
            .await
    }

    /// Decrements the stock counter only when enough units remain.
    /// Returns false when the unit is missing or under-stocked, leaving
    /// the counter untouched.
    pub(crate) async fn decrement(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        size_stock: SizeStockUuid,
        quantity: u64,
    ) -> Result<bool, sqlx::Error> {
        let result = query(DECREMENT_SIZE_STOCK_SQL)
            .bind(size_stock.into_uuid())
            .bind(amount_to_db(quantity)?)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl<'r> FromRow<'r, PgRow> for SizeStockRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: SizeStockUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            size: try_get_size(row, "size")?,
            quantity: try_get_amount(row, "quantity")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
