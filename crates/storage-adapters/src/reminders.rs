//! Reminder selection and dedup markers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::error::Result;
use domains::models::{ReminderCandidate, UserEventNotification};
use domains::ports::ReminderRepo;
use uuid::Uuid;

use crate::store::{map_conflict, map_db_err, PgStore};

#[derive(Debug, sqlx::FromRow)]
struct CandidateRow {
    user_id: Uuid,
    event_id: Uuid,
    start_hour: DateTime<Utc>,
    item_ids: Vec<Uuid>,
}

#[derive(Debug, sqlx::FromRow)]
struct MarkerRow {
    user_id: Uuid,
    event_id: Uuid,
    created: DateTime<Utc>,
}

pub struct PgReminderRepo {
    store: PgStore,
}

impl PgReminderRepo {
    pub fn new(store: PgStore) -> Self {
        PgReminderRepo { store }
    }
}

#[async_trait]
impl ReminderRepo for PgReminderRepo {
    async fn candidates(&self) -> Result<Vec<ReminderCandidate>> {
        // Stakeholders of future events: the owner, plus anyone who earmarked
        // an item. The UNION dedupes the pair when an owner self-earmarked;
        // the owner view then wins and item_ids stays empty.
        let rows = sqlx::query_as::<_, CandidateRow>(
            "WITH stakes AS ( \
                 SELECT user_id, id AS event_id FROM events \
                 WHERE date_trunc('hour', start_time) > now() \
                 UNION \
                 SELECT em.user_id, ei.event_id FROM earmarks em \
                 JOIN event_items ei ON ei.id = em.event_item_id \
                 JOIN events ev ON ev.id = ei.event_id \
                 WHERE date_trunc('hour', ev.start_time) > now() \
             ) \
             SELECT s.user_id, \
                    s.event_id, \
                    date_trunc('hour', ev.start_time) AS start_hour, \
                    CASE WHEN ev.user_id = s.user_id THEN ARRAY[]::uuid[] \
                         ELSE COALESCE(marked.ids, ARRAY[]::uuid[]) END AS item_ids \
             FROM stakes s \
             JOIN events ev ON ev.id = s.event_id \
             LEFT JOIN LATERAL ( \
                 SELECT array_agg(ei.id) AS ids FROM earmarks em \
                 JOIN event_items ei ON ei.id = em.event_item_id \
                 WHERE em.user_id = s.user_id AND ei.event_id = s.event_id \
             ) marked ON TRUE \
             LEFT JOIN user_event_notifications uen \
                 ON uen.user_id = s.user_id AND uen.event_id = s.event_id \
             WHERE uen.user_id IS NULL \
             ORDER BY start_hour, s.event_id, s.user_id",
        )
        .fetch_all(self.store.pool())
        .await
        .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|row| ReminderCandidate {
                user_id: row.user_id,
                event_id: row.event_id,
                when: row.start_hour,
                item_ids: row.item_ids,
            })
            .collect())
    }

    async fn create_marker(&self, user_id: Uuid, event_id: Uuid) -> Result<UserEventNotification> {
        let row = sqlx::query_as::<_, MarkerRow>(
            "INSERT INTO user_event_notifications (user_id, event_id) \
             VALUES ($1, $2) RETURNING *",
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(self.store.pool())
        .await
        .map_err(map_conflict("notification marker"))?;
        Ok(UserEventNotification {
            user_id: row.user_id,
            event_id: row.event_id,
            created: row.created,
        })
    }

    async fn marker_exists(&self, user_id: Uuid, event_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS( \
                 SELECT 1 FROM user_event_notifications \
                 WHERE user_id = $1 AND event_id = $2)",
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(self.store.pool())
        .await
        .map_err(map_db_err)?;
        Ok(exists)
    }
}
