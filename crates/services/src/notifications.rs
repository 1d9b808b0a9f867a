//! # NotificationService
//!
//! In-app notifications. Listing only ever surfaces unread messages; deletes
//! are scoped to the recipient.

use std::sync::Arc;

use domains::error::{Error, Result};
use domains::models::{Notification, Pagination};
use domains::ports::NotificationRepo;
use uuid::Uuid;

pub struct NotificationService {
    notifications: Arc<dyn NotificationRepo>,
}

impl NotificationService {
    pub fn new(notifications: Arc<dyn NotificationRepo>) -> Self {
        NotificationService { notifications }
    }

    pub async fn create_notification(&self, user_id: Uuid, message: &str) -> Result<Notification> {
        domains::validate::not_blank("message", message)?;
        self.notifications.create(user_id, message).await
    }

    pub async fn delete_notification(&self, caller_id: Uuid, notification_id: Uuid) -> Result<()> {
        if caller_id.is_nil() {
            return Err(Error::Unauthenticated);
        }
        let notification = self.notifications.get(notification_id).await?;
        if notification.user_id != caller_id {
            return Err(Error::permission_denied("permission denied"));
        }
        self.notifications.delete(notification.id).await
    }

    /// Clears the caller's whole inbox. Returns the number deleted.
    pub async fn delete_all_notifications(&self, caller_id: Uuid) -> Result<u64> {
        if caller_id.is_nil() {
            return Err(Error::Unauthenticated);
        }
        self.notifications.delete_by_user(caller_id).await
    }

    pub async fn list_notifications(
        &self,
        user_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Notification>, Pagination)> {
        let count = self.notifications.count_unread(user_id).await?;
        let notifications = if count > 0 {
            self.notifications.list_unread(user_id, limit, offset).await?
        } else {
            Vec::new()
        };
        Ok((
            notifications,
            Pagination {
                limit,
                offset,
                count,
            },
        ))
    }
}
