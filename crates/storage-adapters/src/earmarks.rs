//! Earmark repository.
//!
//! The one-earmark-per-item rule lives in the schema (UNIQUE on
//! `event_item_id`); a losing concurrent insert surfaces as `AlreadyExists`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::error::Result;
use domains::models::Earmark;
use domains::ports::EarmarkRepo;
use uuid::Uuid;

use crate::store::{map_conflict, map_db_err, map_not_found, PgStore};

#[derive(Debug, sqlx::FromRow)]
struct EarmarkRow {
    id: Uuid,
    event_item_id: Uuid,
    user_id: Uuid,
    note: String,
    created: DateTime<Utc>,
    last_modified: DateTime<Utc>,
}

impl From<EarmarkRow> for Earmark {
    fn from(row: EarmarkRow) -> Earmark {
        Earmark {
            id: row.id,
            event_item_id: row.event_item_id,
            user_id: row.user_id,
            note: row.note,
            created: row.created,
            last_modified: row.last_modified,
        }
    }
}

pub struct PgEarmarkRepo {
    store: PgStore,
}

impl PgEarmarkRepo {
    pub fn new(store: PgStore) -> Self {
        PgEarmarkRepo { store }
    }
}

#[async_trait]
impl EarmarkRepo for PgEarmarkRepo {
    async fn create(&self, event_item_id: Uuid, user_id: Uuid, note: &str) -> Result<Earmark> {
        let row = sqlx::query_as::<_, EarmarkRow>(
            "INSERT INTO earmarks (id, event_item_id, user_id, note) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(event_item_id)
        .bind(user_id)
        .bind(note)
        .fetch_one(self.store.pool())
        .await
        .map_err(map_conflict("earmark"))?;
        Ok(row.into())
    }

    async fn get(&self, earmark_id: Uuid) -> Result<Earmark> {
        let row = sqlx::query_as::<_, EarmarkRow>("SELECT * FROM earmarks WHERE id = $1")
            .bind(earmark_id)
            .fetch_one(self.store.pool())
            .await
            .map_err(map_not_found("earmark"))?;
        Ok(row.into())
    }

    async fn get_by_item(&self, event_item_id: Uuid) -> Result<Earmark> {
        let row =
            sqlx::query_as::<_, EarmarkRow>("SELECT * FROM earmarks WHERE event_item_id = $1")
                .bind(event_item_id)
                .fetch_one(self.store.pool())
                .await
                .map_err(map_not_found("earmark"))?;
        Ok(row.into())
    }

    async fn get_by_items(&self, item_ids: &[Uuid]) -> Result<Vec<Earmark>> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, EarmarkRow>(
            "SELECT * FROM earmarks WHERE event_item_id = ANY($1) ORDER BY created, id",
        )
        .bind(item_ids)
        .fetch_all(self.store.pool())
        .await
        .map_err(map_db_err)?;
        Ok(rows.into_iter().map(Earmark::from).collect())
    }

    async fn update_note(&self, earmark_id: Uuid, note: &str) -> Result<()> {
        sqlx::query("UPDATE earmarks SET note = $2, last_modified = now() WHERE id = $1")
            .bind(earmark_id)
            .bind(note)
            .execute(self.store.pool())
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn delete(&self, earmark_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM earmarks WHERE id = $1")
            .bind(earmark_id)
            .execute(self.store.pool())
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn list_by_user(&self, user_id: Uuid, archived: bool) -> Result<Vec<Earmark>> {
        let rows = sqlx::query_as::<_, EarmarkRow>(
            "SELECT em.* FROM earmarks em \
             JOIN event_items ei ON ei.id = em.event_item_id \
             JOIN events ev ON ev.id = ei.event_id \
             WHERE em.user_id = $1 AND ev.archived = $2 \
             ORDER BY em.created DESC, em.id DESC",
        )
        .bind(user_id)
        .bind(archived)
        .fetch_all(self.store.pool())
        .await
        .map_err(map_db_err)?;
        Ok(rows.into_iter().map(Earmark::from).collect())
    }
}
