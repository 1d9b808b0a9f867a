//! User repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::error::Result;
use domains::models::{User, UserSettings};
use domains::ports::UserRepo;
use sqlx::types::Json;
use uuid::Uuid;

use crate::store::{map_conflict, map_db_err, map_not_found, PgStore};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    pw_hash: String,
    verified: bool,
    settings: Json<UserSettings>,
    created: DateTime<Utc>,
    last_modified: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> User {
        User {
            id: row.id,
            email: row.email,
            name: row.name,
            pw_hash: row.pw_hash,
            verified: row.verified,
            settings: row.settings.0,
            created: row.created,
            last_modified: row.last_modified,
        }
    }
}

pub struct PgUserRepo {
    store: PgStore,
}

impl PgUserRepo {
    pub fn new(store: PgStore) -> Self {
        PgUserRepo { store }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn create(&self, email: &str, name: &str, pw_hash: &str) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (id, email, name, pw_hash, settings) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(email)
        .bind(name)
        .bind(pw_hash)
        .bind(Json(UserSettings::default()))
        .fetch_one(self.store.pool())
        .await
        .map_err(map_conflict("user"))?;
        Ok(row.into())
    }

    async fn get(&self, user_id: Uuid) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(self.store.pool())
            .await
            .map_err(map_not_found("user"))?;
        Ok(row.into())
    }

    async fn get_by_email(&self, email: &str) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(self.store.pool())
            .await
            .map_err(map_not_found("user"))?;
        Ok(row.into())
    }

    async fn update_settings(&self, user_id: Uuid, settings: &UserSettings) -> Result<()> {
        sqlx::query("UPDATE users SET settings = $2, last_modified = now() WHERE id = $1")
            .bind(user_id)
            .bind(Json(settings))
            .execute(self.store.pool())
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> Result<()> {
        // Events, earmarks, favorites and notifications cascade via FKs.
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(self.store.pool())
            .await
            .map_err(map_db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_maps_settings_blob() {
        let row = UserRow {
            id: Uuid::now_v7(),
            email: "a@example.com".to_string(),
            name: "a".to_string(),
            pw_hash: "$argon2id$opaque".to_string(),
            verified: true,
            settings: Json(UserSettings {
                reminder_threshold_hours: 48,
                enable_reminders: false,
            }),
            created: Utc::now(),
            last_modified: Utc::now(),
        };
        let user = User::from(row);
        assert_eq!(user.settings.reminder_threshold_hours, 48);
        assert!(!user.settings.enable_reminders);
    }
}
