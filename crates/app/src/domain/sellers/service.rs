//! Sellers service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::sellers::{
        data::NewSeller,
        errors::SellersServiceError,
        records::{SellerRecord, SellerUuid},
        repository::PgSellersRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgSellersService {
    db: Db,
    repository: PgSellersRepository,
}

impl PgSellersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgSellersRepository::new(),
        }
    }
}

#[async_trait]
impl SellersService for PgSellersService {
    async fn create_seller(&self, seller: NewSeller) -> Result<SellerRecord, SellersServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_seller(&mut tx, seller).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_seller(&self, seller: SellerUuid) -> Result<SellerRecord, SellersServiceError> {
        let mut tx = self.db.begin().await?;

        let seller = self.repository.get_seller(&mut tx, seller).await?;

        tx.commit().await?;

        Ok(seller)
    }
}

#[automock]
#[async_trait]
pub trait SellersService: Send + Sync {
    /// Creates a new seller for a user.
    async fn create_seller(&self, seller: NewSeller) -> Result<SellerRecord, SellersServiceError>;

    /// Retrieve a single seller.
    async fn get_seller(&self, seller: SellerUuid) -> Result<SellerRecord, SellersServiceError>;
}
