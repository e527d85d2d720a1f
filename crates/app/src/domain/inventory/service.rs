//! Inventory service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        inventory::{
            errors::InventoryServiceError,
            records::{Size, SizeStockRecord, SizeStockUuid},
            repository::PgSizeStocksRepository,
        },
        products::records::ProductUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgInventoryService {
    db: Db,
    repository: PgSizeStocksRepository,
}

impl PgInventoryService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgSizeStocksRepository::new(),
        }
    }
}

#[async_trait]
impl InventoryService for PgInventoryService {
    async fn get_unit(
        &self,
        product: ProductUuid,
        size: Size,
    ) -> Result<SizeStockRecord, InventoryServiceError> {
        let mut tx = self.db.begin().await?;

        let unit = self.repository.get_unit(&mut tx, product, size).await?;

        tx.commit().await?;

        Ok(unit)
    }

    async fn get_unit_by_uuid(
        &self,
        size_stock: SizeStockUuid,
    ) -> Result<SizeStockRecord, InventoryServiceError> {
        let mut tx = self.db.begin().await?;

        let unit = self.repository.get_by_uuid(&mut tx, size_stock).await?;

        tx.commit().await?;

        Ok(unit)
    }

    async fn check_available(
        &self,
        product: ProductUuid,
        size: Size,
        quantity: u64,
    ) -> Result<bool, InventoryServiceError> {
        let mut tx = self.db.begin().await?;

        let unit = self.repository.get_unit(&mut tx, product, size).await?;

        tx.commit().await?;

        Ok(unit.quantity >= quantity)
    }
}

#[automock]
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Looks up the stock unit for a product in a given size.
    async fn get_unit(
        &self,
        product: ProductUuid,
        size: Size,
    ) -> Result<SizeStockRecord, InventoryServiceError>;

    /// Looks up a stock unit directly by its identifier.
    async fn get_unit_by_uuid(
        &self,
        size_stock: SizeStockUuid,
    ) -> Result<SizeStockRecord, InventoryServiceError>;

    /// Reports whether at least `quantity` units of a product in a size
    /// are currently in stock. Advisory only; checkout re-verifies under
    /// its own transaction.
    async fn check_available(
        &self,
        product: ProductUuid,
        size: Size,
        quantity: u64,
    ) -> Result<bool, InventoryServiceError>;
}
