//! Notification repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::error::Result;
use domains::models::Notification;
use domains::ports::NotificationRepo;
use uuid::Uuid;

use crate::store::{map_db_err, map_not_found, PgStore};

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    user_id: Uuid,
    message: String,
    read: bool,
    created: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Notification {
        Notification {
            id: row.id,
            user_id: row.user_id,
            message: row.message,
            read: row.read,
            created: row.created,
        }
    }
}

pub struct PgNotificationRepo {
    store: PgStore,
}

impl PgNotificationRepo {
    pub fn new(store: PgStore) -> Self {
        PgNotificationRepo { store }
    }
}

#[async_trait]
impl NotificationRepo for PgNotificationRepo {
    async fn create(&self, user_id: Uuid, message: &str) -> Result<Notification> {
        let row = sqlx::query_as::<_, NotificationRow>(
            "INSERT INTO notifications (id, user_id, message) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(message)
        .fetch_one(self.store.pool())
        .await
        .map_err(map_db_err)?;
        Ok(row.into())
    }

    async fn get(&self, notification_id: Uuid) -> Result<Notification> {
        let row =
            sqlx::query_as::<_, NotificationRow>("SELECT * FROM notifications WHERE id = $1")
                .bind(notification_id)
                .fetch_one(self.store.pool())
                .await
                .map_err(map_not_found("notification"))?;
        Ok(row.into())
    }

    async fn delete(&self, notification_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(notification_id)
            .execute(self.store.pool())
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn delete_by_user(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE user_id = $1")
            .bind(user_id)
            .execute(self.store.pool())
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected())
    }

    async fn list_unread(
        &self,
        user_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            "SELECT * FROM notifications WHERE user_id = $1 AND read = FALSE \
             ORDER BY created DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(self.store.pool())
        .await
        .map_err(map_db_err)?;
        Ok(rows.into_iter().map(Notification::from).collect())
    }

    async fn count_unread(&self, user_id: Uuid) -> Result<u32> {
        let count: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM notifications WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .fetch_one(self.store.pool())
        .await
        .map_err(map_db_err)?;
        Ok(count as u32)
    }
}
