//! Notifications Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};

use crate::domain::{
    notifications::records::{NotificationRecord, NotificationUuid},
    users::records::UserUuid,
};

const NOTIFY_USER_SQL: &str = include_str!("sql/notify_user.sql");
const LIST_NOTIFICATIONS_FOR_USER_SQL: &str = include_str!("sql/list_notifications_for_user.sql");
const COUNT_UNREAD_NOTIFICATIONS_SQL: &str = include_str!("sql/count_unread_notifications.sql");
const MARK_ALL_NOTIFICATIONS_READ_SQL: &str = include_str!("sql/mark_all_notifications_read.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgNotificationsRepository;

impl PgNotificationsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Inserts a notification for the user if the user still exists.
    /// Returns None for unknown recipients instead of failing, so that
    /// callers never abort on a stale recipient.
    pub(crate) async fn notify(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        message: &str,
    ) -> Result<Option<NotificationRecord>, sqlx::Error> {
        query_as::<Postgres, NotificationRecord>(NOTIFY_USER_SQL)
            .bind(NotificationUuid::new().into_uuid())
            .bind(user.into_uuid())
            .bind(message)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_for_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<NotificationRecord>, sqlx::Error> {
        query_as::<Postgres, NotificationRecord>(LIST_NOTIFICATIONS_FOR_USER_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn count_unread(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<i64, sqlx::Error> {
        query_scalar::<Postgres, i64>(COUNT_UNREAD_NOTIFICATIONS_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn mark_all_read(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<u64, sqlx::Error> {
        let result = query(MARK_ALL_NOTIFICATIONS_READ_SQL)
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }
}

impl<'r> FromRow<'r, PgRow> for NotificationRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: NotificationUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            message: row.try_get("message")?,
            is_read: row.try_get("is_read")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
