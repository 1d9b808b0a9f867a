//! Event item repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::error::Result;
use domains::models::EventItem;
use domains::ports::EventItemRepo;
use uuid::Uuid;

use crate::store::{map_db_err, map_not_found, PgStore};

#[derive(Debug, sqlx::FromRow)]
struct EventItemRow {
    id: Uuid,
    event_id: Uuid,
    description: String,
    created: DateTime<Utc>,
    last_modified: DateTime<Utc>,
}

impl From<EventItemRow> for EventItem {
    fn from(row: EventItemRow) -> EventItem {
        EventItem {
            id: row.id,
            event_id: row.event_id,
            description: row.description,
            created: row.created,
            last_modified: row.last_modified,
        }
    }
}

pub struct PgEventItemRepo {
    store: PgStore,
}

impl PgEventItemRepo {
    pub fn new(store: PgStore) -> Self {
        PgEventItemRepo { store }
    }
}

#[async_trait]
impl EventItemRepo for PgEventItemRepo {
    async fn create(&self, event_id: Uuid, description: &str) -> Result<EventItem> {
        let row = sqlx::query_as::<_, EventItemRow>(
            "INSERT INTO event_items (id, event_id, description) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(event_id)
        .bind(description)
        .fetch_one(self.store.pool())
        .await
        .map_err(map_db_err)?;
        Ok(row.into())
    }

    async fn get(&self, item_id: Uuid) -> Result<EventItem> {
        let row = sqlx::query_as::<_, EventItemRow>("SELECT * FROM event_items WHERE id = $1")
            .bind(item_id)
            .fetch_one(self.store.pool())
            .await
            .map_err(map_not_found("event-item"))?;
        Ok(row.into())
    }

    async fn get_many(&self, item_ids: &[Uuid]) -> Result<Vec<EventItem>> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, EventItemRow>(
            "SELECT * FROM event_items WHERE id = ANY($1) ORDER BY created, id",
        )
        .bind(item_ids)
        .fetch_all(self.store.pool())
        .await
        .map_err(map_db_err)?;
        Ok(rows.into_iter().map(EventItem::from).collect())
    }

    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<EventItem>> {
        let rows = sqlx::query_as::<_, EventItemRow>(
            "SELECT * FROM event_items WHERE event_id = $1 ORDER BY created, id",
        )
        .bind(event_id)
        .fetch_all(self.store.pool())
        .await
        .map_err(map_db_err)?;
        Ok(rows.into_iter().map(EventItem::from).collect())
    }

    async fn update_description(&self, item_id: Uuid, description: &str) -> Result<()> {
        sqlx::query(
            "UPDATE event_items SET description = $2, last_modified = now() WHERE id = $1",
        )
        .bind(item_id)
        .bind(description)
        .execute(self.store.pool())
        .await
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn delete(&self, item_id: Uuid) -> Result<()> {
        // any earmark on the item goes with it
        self.store
            .in_txn(move |conn| {
                Box::pin(async move {
                    sqlx::query("DELETE FROM earmarks WHERE event_item_id = $1")
                        .bind(item_id)
                        .execute(&mut *conn)
                        .await
                        .map_err(map_db_err)?;
                    sqlx::query("DELETE FROM event_items WHERE id = $1")
                        .bind(item_id)
                        .execute(&mut *conn)
                        .await
                        .map_err(map_db_err)?;
                    Ok(())
                })
            })
            .await
    }
}
