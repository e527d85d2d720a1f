//! Notifications service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        notifications::{
            errors::NotificationsServiceError, records::NotificationRecord,
            repository::PgNotificationsRepository,
        },
        users::records::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgNotificationsService {
    db: Db,
    repository: PgNotificationsRepository,
}

impl PgNotificationsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgNotificationsRepository::new(),
        }
    }
}

#[async_trait]
impl NotificationsService for PgNotificationsService {
    async fn notify(
        &self,
        user: UserUuid,
        message: &str,
    ) -> Result<Option<NotificationRecord>, NotificationsServiceError> {
        let mut tx = self.db.begin().await?;

        let notification = self.repository.notify(&mut tx, user, message).await?;

        tx.commit().await?;

        Ok(notification)
    }

    async fn list_for_user(
        &self,
        user: UserUuid,
    ) -> Result<Vec<NotificationRecord>, NotificationsServiceError> {
        let mut tx = self.db.begin().await?;

        let notifications = self.repository.list_for_user(&mut tx, user).await?;

        tx.commit().await?;

        Ok(notifications)
    }

    async fn unread_count(&self, user: UserUuid) -> Result<u64, NotificationsServiceError> {
        let mut tx = self.db.begin().await?;

        let count = self.repository.count_unread(&mut tx, user).await?;

        tx.commit().await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn mark_all_read(&self, user: UserUuid) -> Result<u64, NotificationsServiceError> {
        let mut tx = self.db.begin().await?;

        let marked = self.repository.mark_all_read(&mut tx, user).await?;

        tx.commit().await?;

        Ok(marked)
    }
}

#[automock]
#[async_trait]
pub trait NotificationsService: Send + Sync {
    /// Delivers a message to a user. Unknown recipients are skipped and
    /// reported as None rather than an error.
    async fn notify(
        &self,
        user: UserUuid,
        message: &str,
    ) -> Result<Option<NotificationRecord>, NotificationsServiceError>;

    /// The user's notifications, newest first.
    async fn list_for_user(
        &self,
        user: UserUuid,
    ) -> Result<Vec<NotificationRecord>, NotificationsServiceError>;

    /// Number of unread notifications.
    async fn unread_count(&self, user: UserUuid) -> Result<u64, NotificationsServiceError>;

    /// Marks every unread notification read. Returns how many changed.
    async fn mark_all_read(&self, user: UserUuid) -> Result<u64, NotificationsServiceError>;
}
