//! # Domain Models
//!
//! These structs represent the core entities of the event-planning domain.
//! We use UUID v7 for time-ordered, globally unique identification.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default reminder lead time when a user has never configured one.
pub const DEFAULT_REMINDER_THRESHOLD_HOURS: u8 = 24;

/// Smallest configurable reminder lead time, in hours.
pub const MIN_REMINDER_THRESHOLD_HOURS: u8 = 2;

/// Largest configurable reminder lead time, in hours (one week).
pub const MAX_REMINDER_THRESHOLD_HOURS: u8 = 168;

/// Per-user reminder preferences, persisted as a JSON blob on the user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default = "default_threshold")]
    pub reminder_threshold_hours: u8,
    #[serde(default = "default_enabled")]
    pub enable_reminders: bool,
}

fn default_threshold() -> u8 {
    DEFAULT_REMINDER_THRESHOLD_HOURS
}

fn default_enabled() -> bool {
    true
}

impl Default for UserSettings {
    fn default() -> Self {
        UserSettings {
            reminder_threshold_hours: DEFAULT_REMINDER_THRESHOLD_HOURS,
            enable_reminders: true,
        }
    }
}

impl UserSettings {
    /// Lead time with the stored-zero legacy value mapped to the default.
    pub fn effective_threshold_hours(&self) -> u8 {
        if self.reminder_threshold_hours == 0 {
            DEFAULT_REMINDER_THRESHOLD_HOURS
        } else {
            self.reminder_threshold_hours
        }
    }
}

/// An account. The password credential is an opaque hash; hashing itself
/// happens outside this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub pw_hash: String,
    pub verified: bool,
    pub settings: UserSettings,
    pub created: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

/// A planned gathering, owned by exactly one user.
///
/// `item_sort_order` is the owner-chosen display ordering of the event's
/// items. Once `archived` is set the event is read-only for item, earmark
/// and sort-order mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub tz: Tz,
    pub item_sort_order: Vec<Uuid>,
    pub archived: bool,
    pub created: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl Event {
    /// Event start localized to its own zone, as shown in reminder mail.
    pub fn local_start(&self) -> DateTime<Tz> {
        self.start_time.with_timezone(&self.tz)
    }
}

/// Something to bring to an event. Belongs to exactly one event; the parent
/// relation is immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventItem {
    pub id: Uuid,
    pub event_id: Uuid,
    pub description: String,
    pub created: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

/// A user's claim to bring a specific event item. At most one earmark may
/// exist per item (enforced by a storage uniqueness constraint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Earmark {
    pub id: Uuid,
    pub event_item_id: Uuid,
    pub user_id: Uuid,
    pub note: String,
    pub created: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

/// A bookmark on somebody else's event. At most one per (user, event) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub created: DateTime<Utc>,
}

/// An in-app message for one user. Listing only ever returns unread ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub read: bool,
    pub created: DateTime<Utc>,
}

/// Dedup marker: user X has already been reminded about event Y.
/// Written once after a successful dispatch, never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEventNotification {
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub created: DateTime<Utc>,
}

/// One row of the reminder selection: a (user, event) pair with no dedup
/// marker yet, where the user has a stake in a future event.
///
/// `item_ids` holds the items this user earmarked on the event; it is empty
/// when the stake is ownership (the owner gets the full-event view).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderCandidate {
    pub user_id: Uuid,
    pub event_id: Uuid,
    /// Event start, truncated to the hour, in UTC.
    pub when: DateTime<Utc>,
    pub item_ids: Vec<Uuid>,
}

/// Coalescing partial update for an event: only `Some` fields change.
#[derive(Debug, Clone, Default)]
pub struct EventChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub tz: Option<Tz>,
    pub item_sort_order: Option<Vec<Uuid>>,
}

impl EventChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.start_time.is_none()
            && self.tz.is_none()
            && self.item_sort_order.is_none()
    }

    /// Fold the changes into a loaded event, mirroring what the coalescing
    /// UPDATE does server-side.
    pub fn apply_to(self, event: &mut Event) {
        if let Some(name) = self.name {
            event.name = name;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(start_time) = self.start_time {
            event.start_time = start_time;
        }
        if let Some(tz) = self.tz {
            event.tz = tz;
        }
        if let Some(order) = self.item_sort_order {
            event.item_sort_order = order;
        }
    }
}

/// Offset pagination envelope returned alongside list results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
    pub count: u32,
}
