//! Shipments Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::domain::orders::records::{OrderUuid, ShipmentRecord, ShipmentUuid};

const CREATE_SHIPMENT_SQL: &str = include_str!("../sql/create_shipment.sql");
const LIST_SHIPMENTS_FOR_ORDERS_SQL: &str = include_str!("../sql/list_shipments_for_orders.sql");
const UPDATE_SHIPMENT_SQL: &str = include_str!("../sql/update_shipment.sql");
const DELETE_SHIPMENT_SQL: &str = include_str!("../sql/delete_shipment.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgShipmentsRepository;

impl PgShipmentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_shipment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<ShipmentRecord, sqlx::Error> {
        query_as::<Postgres, ShipmentRecord>(CREATE_SHIPMENT_SQL)
            .bind(ShipmentUuid::new().into_uuid())
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// The shipments of a batch of orders in one query.
    pub(crate) async fn list_for_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &[OrderUuid],
    ) -> Result<Vec<ShipmentRecord>, sqlx::Error> {
        let uuids: Vec<Uuid> = orders.iter().map(|order| order.into_uuid()).collect();

        query_as::<Postgres, ShipmentRecord>(LIST_SHIPMENTS_FOR_ORDERS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn update_shipment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: Option<&str>,
        delivery_date: Option<Timestamp>,
    ) -> Result<Option<ShipmentRecord>, sqlx::Error> {
        query_as::<Postgres, ShipmentRecord>(UPDATE_SHIPMENT_SQL)
            .bind(order.into_uuid())
            .bind(status)
            .bind(delivery_date.map(SqlxTimestamp::from))
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn delete_for_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<u64, sqlx::Error> {
        let result = query(DELETE_SHIPMENT_SQL)
            .bind(order.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }
}

impl<'r> FromRow<'r, PgRow> for ShipmentRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ShipmentUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            status: row.try_get("status")?,
            delivery_date: row
                .try_get::<Option<SqlxTimestamp>, _>("delivery_date")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
