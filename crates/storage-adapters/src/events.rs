//! Event repository: row mapping and queries for the `events` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use domains::error::{Error, Result};
use domains::models::{Event, EventChanges};
use domains::ports::EventRepo;
use uuid::Uuid;

use crate::store::{map_db_err, map_not_found, PgStore};

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct EventRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    description: String,
    start_time: DateTime<Utc>,
    tz: String,
    item_sort_order: Vec<Uuid>,
    archived: bool,
    created: DateTime<Utc>,
    last_modified: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = Error;

    fn try_from(row: EventRow) -> Result<Event> {
        let tz: Tz = row.tz.parse().map_err(|_| {
            tracing::error!(event_id = %row.id, tz = %row.tz, "stored timezone no longer parses");
            Error::internal("db error")
        })?;
        Ok(Event {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            description: row.description,
            start_time: row.start_time,
            tz,
            item_sort_order: row.item_sort_order,
            archived: row.archived,
            created: row.created,
            last_modified: row.last_modified,
        })
    }
}

pub(crate) fn rows_to_events(rows: Vec<EventRow>) -> Result<Vec<Event>> {
    rows.into_iter().map(Event::try_from).collect()
}

pub struct PgEventRepo {
    store: PgStore,
}

impl PgEventRepo {
    pub fn new(store: PgStore) -> Self {
        PgEventRepo { store }
    }
}

#[async_trait]
impl EventRepo for PgEventRepo {
    async fn create(
        &self,
        user_id: Uuid,
        name: &str,
        description: &str,
        start_time: DateTime<Utc>,
        tz: Tz,
    ) -> Result<Event> {
        let row = sqlx::query_as::<_, EventRow>(
            "INSERT INTO events (id, user_id, name, description, start_time, tz) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(name)
        .bind(description)
        .bind(start_time)
        .bind(tz.name())
        .fetch_one(self.store.pool())
        .await
        .map_err(map_db_err)?;
        row.try_into()
    }

    async fn get(&self, event_id: Uuid) -> Result<Event> {
        let row = sqlx::query_as::<_, EventRow>("SELECT * FROM events WHERE id = $1")
            .bind(event_id)
            .fetch_one(self.store.pool())
            .await
            .map_err(map_not_found("event"))?;
        row.try_into()
    }

    async fn get_by_item(&self, item_id: Uuid) -> Result<Event> {
        let row = sqlx::query_as::<_, EventRow>(
            "SELECT e.* FROM events e \
             JOIN event_items ei ON ei.event_id = e.id \
             WHERE ei.id = $1",
        )
        .bind(item_id)
        .fetch_one(self.store.pool())
        .await
        .map_err(map_not_found("event"))?;
        row.try_into()
    }

    async fn update(&self, event_id: Uuid, changes: EventChanges) -> Result<()> {
        sqlx::query(
            "UPDATE events SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                start_time = COALESCE($4, start_time), \
                tz = COALESCE($5, tz), \
                item_sort_order = COALESCE($6, item_sort_order), \
                last_modified = now() \
             WHERE id = $1",
        )
        .bind(event_id)
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.start_time)
        .bind(changes.tz.map(|tz| tz.name().to_string()))
        .bind(changes.item_sort_order)
        .execute(self.store.pool())
        .await
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn delete(&self, event_id: Uuid) -> Result<()> {
        // Earmarks, items, favorites and dedup markers go with the event,
        // all-or-nothing.
        self.store
            .in_txn(move |conn| {
                Box::pin(async move {
                    sqlx::query("DELETE FROM user_event_notifications WHERE event_id = $1")
                        .bind(event_id)
                        .execute(&mut *conn)
                        .await
                        .map_err(map_db_err)?;
                    sqlx::query(
                        "DELETE FROM earmarks WHERE event_item_id IN \
                         (SELECT id FROM event_items WHERE event_id = $1)",
                    )
                    .bind(event_id)
                    .execute(&mut *conn)
                    .await
                    .map_err(map_db_err)?;
                    sqlx::query("DELETE FROM event_items WHERE event_id = $1")
                        .bind(event_id)
                        .execute(&mut *conn)
                        .await
                        .map_err(map_db_err)?;
                    sqlx::query("DELETE FROM favorites WHERE event_id = $1")
                        .bind(event_id)
                        .execute(&mut *conn)
                        .await
                        .map_err(map_db_err)?;
                    sqlx::query("DELETE FROM events WHERE id = $1")
                        .bind(event_id)
                        .execute(&mut *conn)
                        .await
                        .map_err(map_db_err)?;
                    Ok(())
                })
            })
            .await
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: u32,
        offset: u32,
        archived: bool,
    ) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(
            "SELECT * FROM events WHERE user_id = $1 AND archived = $2 \
             ORDER BY start_time DESC, id DESC LIMIT $3 OFFSET $4",
        )
        .bind(user_id)
        .bind(archived)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(self.store.pool())
        .await
        .map_err(map_db_err)?;
        rows_to_events(rows)
    }

    async fn count_by_user(&self, user_id: Uuid, archived: bool) -> Result<u32> {
        let count: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM events WHERE user_id = $1 AND archived = $2",
        )
        .bind(user_id)
        .bind(archived)
        .fetch_one(self.store.pool())
        .await
        .map_err(map_db_err)?;
        Ok(count as u32)
    }

    async fn archive_started_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE events SET archived = TRUE, last_modified = now() \
             WHERE archived = FALSE AND date_trunc('hour', start_time) < $1",
        )
        .bind(cutoff)
        .execute(self.store.pool())
        .await
        .map_err(map_db_err)?;
        Ok(result.rows_affected())
    }
}
