//! Products service.

use std::collections::HashSet;

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        inventory::{
            PgSizeStocksRepository,
            data::NewSizeStock,
            records::{SizeStockRecord, SizeStockUuid},
        },
        products::{
            data::NewProduct,
            errors::ProductsServiceError,
            records::{ProductRecord, ProductUuid, ProductWithStocks},
            repository::PgProductsRepository,
        },
        sellers::records::SellerUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgProductsService {
    db: Db,
    repository: PgProductsRepository,
    size_stocks: PgSizeStocksRepository,
}

impl PgProductsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgProductsRepository::new(),
            size_stocks: PgSizeStocksRepository::new(),
        }
    }
}

#[async_trait]
impl ProductsService for PgProductsService {
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductWithStocks, ProductsServiceError> {
        let mut seen = HashSet::new();
        for entry in &product.stocks {
            if !seen.insert(entry.size) {
                return Err(ProductsServiceError::DuplicateSize(entry.size));
            }
        }

        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_product(
                &mut tx,
                product.uuid,
                product.seller_uuid,
                &product.name,
                product.price,
            )
            .await?;

        let mut stocks: Vec<SizeStockRecord> = Vec::with_capacity(product.stocks.len());
        for entry in product.stocks {
            let stock = self
                .size_stocks
                .create_size_stock(
                    &mut tx,
                    NewSizeStock {
                        uuid: SizeStockUuid::new(),
                        product_uuid: created.uuid,
                        size: entry.size,
                        quantity: entry.quantity,
                    },
                )
                .await?;

            stocks.push(stock);
        }

        tx.commit().await?;

        Ok(ProductWithStocks {
            product: created,
            stocks,
        })
    }

    async fn get_product(
        &self,
        product: ProductUuid,
    ) -> Result<ProductWithStocks, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.get_product(&mut tx, product).await?;
        let stocks = self.size_stocks.list_for_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(ProductWithStocks {
            product: record,
            stocks,
        })
    }

    async fn list_by_seller(
        &self,
        seller: SellerUuid,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let products = self.repository.list_for_seller(&mut tx, seller).await?;

        tx.commit().await?;

        Ok(products)
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Creates a product and its per-size stock units in one transaction.
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductWithStocks, ProductsServiceError>;

    /// Retrieves a product together with its stock units.
    async fn get_product(
        &self,
        product: ProductUuid,
    ) -> Result<ProductWithStocks, ProductsServiceError>;

    /// Lists a seller's products, oldest first.
    async fn list_by_seller(
        &self,
        seller: SellerUuid,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError>;
}
