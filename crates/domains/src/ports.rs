//! # Ports
//!
//! Capability interfaces consumed by the service layer. Storage adapters and
//! the mail adapter implement these; tests substitute mockall mocks (enable
//! the `testing` feature to get the generated `MockXxx` types).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Earmark, Event, EventChanges, EventItem, Favorite, Notification, ReminderCandidate, User,
    UserEventNotification, UserSettings,
};

/// Persistence contract for user accounts and their reminder settings.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create(&self, email: &str, name: &str, pw_hash: &str) -> Result<User>;
    async fn get(&self, user_id: Uuid) -> Result<User>;
    async fn get_by_email(&self, email: &str) -> Result<User>;
    async fn update_settings(&self, user_id: Uuid, settings: &UserSettings) -> Result<()>;
    async fn delete(&self, user_id: Uuid) -> Result<()>;
}

/// Persistence contract for events.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait EventRepo: Send + Sync {
    async fn create(
        &self,
        user_id: Uuid,
        name: &str,
        description: &str,
        start_time: DateTime<Utc>,
        tz: Tz,
    ) -> Result<Event>;
    async fn get(&self, event_id: Uuid) -> Result<Event>;
    /// Parent event of an item, resolved in one join.
    async fn get_by_item(&self, item_id: Uuid) -> Result<Event>;
    /// Coalescing partial update: only `Some` fields of `changes` are written.
    async fn update(&self, event_id: Uuid, changes: EventChanges) -> Result<()>;
    /// Deletes the event and everything hanging off it (items, earmarks,
    /// favorites, dedup markers) in one transaction.
    async fn delete(&self, event_id: Uuid) -> Result<()>;
    async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: u32,
        offset: u32,
        archived: bool,
    ) -> Result<Vec<Event>>;
    async fn count_by_user(&self, user_id: Uuid, archived: bool) -> Result<u32>;
    /// Bulk sweep: marks every non-archived event whose start hour is before
    /// `cutoff` as archived. Returns the number of rows flipped.
    async fn archive_started_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

/// Persistence contract for event items.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait EventItemRepo: Send + Sync {
    async fn create(&self, event_id: Uuid, description: &str) -> Result<EventItem>;
    async fn get(&self, item_id: Uuid) -> Result<EventItem>;
    async fn get_many(&self, item_ids: &[Uuid]) -> Result<Vec<EventItem>>;
    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<EventItem>>;
    async fn update_description(&self, item_id: Uuid, description: &str) -> Result<()>;
    async fn delete(&self, item_id: Uuid) -> Result<()>;
}

/// Persistence contract for earmarks.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait EarmarkRepo: Send + Sync {
    /// Insert fails with `AlreadyExists` when the item is already earmarked;
    /// the storage layer enforces the one-earmark-per-item constraint.
    async fn create(&self, event_item_id: Uuid, user_id: Uuid, note: &str) -> Result<Earmark>;
    async fn get(&self, earmark_id: Uuid) -> Result<Earmark>;
    async fn get_by_item(&self, event_item_id: Uuid) -> Result<Earmark>;
    async fn get_by_items(&self, item_ids: &[Uuid]) -> Result<Vec<Earmark>>;
    async fn update_note(&self, earmark_id: Uuid, note: &str) -> Result<()>;
    async fn delete(&self, earmark_id: Uuid) -> Result<()>;
    async fn list_by_user(&self, user_id: Uuid, archived: bool) -> Result<Vec<Earmark>>;
}

/// Persistence contract for favorites.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait FavoriteRepo: Send + Sync {
    /// Insert fails with `AlreadyExists` on a duplicate (user, event) pair.
    async fn create(&self, user_id: Uuid, event_id: Uuid) -> Result<Favorite>;
    async fn get_by_user_event(&self, user_id: Uuid, event_id: Uuid) -> Result<Favorite>;
    async fn delete(&self, favorite_id: Uuid) -> Result<()>;
    async fn list_events_by_user(
        &self,
        user_id: Uuid,
        limit: u32,
        offset: u32,
        archived: bool,
    ) -> Result<Vec<Event>>;
}

/// Persistence contract for in-app notifications.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait NotificationRepo: Send + Sync {
    async fn create(&self, user_id: Uuid, message: &str) -> Result<Notification>;
    async fn get(&self, notification_id: Uuid) -> Result<Notification>;
    async fn delete(&self, notification_id: Uuid) -> Result<()>;
    async fn delete_by_user(&self, user_id: Uuid) -> Result<u64>;
    /// Unread notifications only, newest first.
    async fn list_unread(&self, user_id: Uuid, limit: u32, offset: u32)
        -> Result<Vec<Notification>>;
    async fn count_unread(&self, user_id: Uuid) -> Result<u32>;
}

/// Persistence contract for reminder selection and dedup markers.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ReminderRepo: Send + Sync {
    /// All (user, event) pairs eligible for a reminder this cycle: the event
    /// starts in the future, the user is the owner or has earmarked an item,
    /// and no dedup marker exists yet for the pair.
    async fn candidates(&self) -> Result<Vec<ReminderCandidate>>;
    async fn create_marker(&self, user_id: Uuid, event_id: Uuid) -> Result<UserEventNotification>;
    async fn marker_exists(&self, user_id: Uuid, event_id: Uuid) -> Result<bool>;
}

/// An outbound mail message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    /// `None` lets the sender fall back to its configured default address.
    pub from: Option<String>,
    pub to: Vec<String>,
    pub subject: String,
    pub body_plain: String,
    pub body_html: String,
    pub extra_headers: Vec<(String, String)>,
}

/// Mail dispatch contract. Any error is fatal to the current scheduler cycle.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, mail: Mail) -> Result<()>;
}

/// Wall-clock source, injected so tests can pin "now".
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The production clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
