//! # UserService
//!
//! Account lookups and reminder preferences. Credential handling (hashing,
//! verification mail) lives outside this core; the service only stores the
//! opaque hash it is given.

use std::sync::Arc;

use domains::error::Result;
use domains::models::{User, UserSettings};
use domains::ports::UserRepo;
use domains::validate;
use uuid::Uuid;

pub struct UserService {
    users: Arc<dyn UserRepo>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepo>) -> Self {
        UserService { users }
    }

    pub async fn register_user(&self, email: &str, name: &str, pw_hash: &str) -> Result<User> {
        validate::not_blank("email", email)?;
        validate::not_blank("name", name)?;
        validate::not_blank("pw_hash", pw_hash)?;
        self.users.create(email, name, pw_hash).await
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User> {
        self.users.get(user_id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<User> {
        self.users.get_by_email(email).await
    }

    pub async fn update_reminder_settings(
        &self,
        caller: &User,
        enable_reminders: bool,
        threshold_hours: u8,
    ) -> Result<UserSettings> {
        validate::reminder_threshold("reminder_threshold", threshold_hours)?;
        let settings = UserSettings {
            reminder_threshold_hours: threshold_hours,
            enable_reminders,
        };
        self.users.update_settings(caller.id, &settings).await?;
        Ok(settings)
    }

    pub async fn delete_account(&self, user_id: Uuid) -> Result<()> {
        self.users.delete(user_id).await
    }
}
