//! Favorite repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::error::Result;
use domains::models::{Event, Favorite};
use domains::ports::FavoriteRepo;
use uuid::Uuid;

use crate::events::{rows_to_events, EventRow};
use crate::store::{map_conflict, map_db_err, map_not_found, PgStore};

#[derive(Debug, sqlx::FromRow)]
struct FavoriteRow {
    id: Uuid,
    user_id: Uuid,
    event_id: Uuid,
    created: DateTime<Utc>,
}

impl From<FavoriteRow> for Favorite {
    fn from(row: FavoriteRow) -> Favorite {
        Favorite {
            id: row.id,
            user_id: row.user_id,
            event_id: row.event_id,
            created: row.created,
        }
    }
}

pub struct PgFavoriteRepo {
    store: PgStore,
}

impl PgFavoriteRepo {
    pub fn new(store: PgStore) -> Self {
        PgFavoriteRepo { store }
    }
}

#[async_trait]
impl FavoriteRepo for PgFavoriteRepo {
    async fn create(&self, user_id: Uuid, event_id: Uuid) -> Result<Favorite> {
        let row = sqlx::query_as::<_, FavoriteRow>(
            "INSERT INTO favorites (id, user_id, event_id) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(event_id)
        .fetch_one(self.store.pool())
        .await
        .map_err(map_conflict("favorite"))?;
        Ok(row.into())
    }

    async fn get_by_user_event(&self, user_id: Uuid, event_id: Uuid) -> Result<Favorite> {
        let row = sqlx::query_as::<_, FavoriteRow>(
            "SELECT * FROM favorites WHERE user_id = $1 AND event_id = $2",
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(self.store.pool())
        .await
        .map_err(map_not_found("favorite"))?;
        Ok(row.into())
    }

    async fn delete(&self, favorite_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM favorites WHERE id = $1")
            .bind(favorite_id)
            .execute(self.store.pool())
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn list_events_by_user(
        &self,
        user_id: Uuid,
        limit: u32,
        offset: u32,
        archived: bool,
    ) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(
            "SELECT e.* FROM events e \
             JOIN favorites f ON f.event_id = e.id \
             WHERE f.user_id = $1 AND e.archived = $2 \
             ORDER BY e.start_time DESC, e.id DESC LIMIT $3 OFFSET $4",
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
}
