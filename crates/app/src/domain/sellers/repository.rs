//! Sellers Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::domain::{
    sellers::{
        data::NewSeller,
        records::{SellerRecord, SellerUuid},
    },
    users::records::UserUuid,
};

const CREATE_SELLER_SQL: &str = include_str!("sql/create_seller.sql");
const GET_SELLER_SQL: &str = include_str!("sql/get_seller.sql");
const LIST_SELLER_USERS_SQL: &str = include_str!("sql/list_seller_users.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgSellersRepository;

impl PgSellersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_seller(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        seller: NewSeller,
    ) -> Result<SellerRecord, sqlx::Error> {
        query_as::<Postgres, SellerRecord>(CREATE_SELLER_SQL)
            .bind(seller.uuid.into_uuid())
            .bind(seller.user_uuid.into_uuid())
            .bind(seller.name)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_seller(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        seller: SellerUuid,
    ) -> Result<SellerRecord, sqlx::Error> {
        query_as::<Postgres, SellerRecord>(GET_SELLER_SQL)
            .bind(seller.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Resolves each seller to the user account behind it, for
    /// addressing seller notifications.
    pub(crate) async fn list_seller_users(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sellers: &[SellerUuid],
    ) -> Result<Vec<(SellerUuid, UserUuid)>, sqlx::Error> {
        let uuids: Vec<Uuid> = sellers.iter().map(|s| s.into_uuid()).collect();

        let rows = query_as::<Postgres, (Uuid, Uuid)>(LIST_SELLER_USERS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(seller, user)| (SellerUuid::from_uuid(seller), UserUuid::from_uuid(user)))
            .collect())
    }
}

impl<'r> FromRow<'r, PgRow> for SellerRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: SellerUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            name: row.try_get("name")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
