//! Fixture builders shared across the service test modules.

use chrono::{Duration, Utc};
use domains::models::{Earmark, Event, EventItem, Notification, User, UserSettings};
use uuid::Uuid;

pub fn user(verified: bool) -> User {
    let now = Utc::now();
    User {
        id: Uuid::now_v7(),
        email: "guest@example.com".to_string(),
        name: "Guest".to_string(),
        pw_hash: "$argon2$fake".to_string(),
        verified,
        settings: UserSettings::default(),
        created: now,
        last_modified: now,
    }
}

pub fn event(owner_id: Uuid, archived: bool) -> Event {
    let now = Utc::now();
    Event {
        id: Uuid::now_v7(),
        user_id: owner_id,
        name: "Spring Picnic".to_string(),
        description: "Bring a dish to share".to_string(),
        start_time: now + Duration::days(7),
        tz: chrono_tz::UTC,
        item_sort_order: vec![],
        archived,
        created: now,
        last_modified: now,
    }
}

pub fn item(event_id: Uuid) -> EventItem {
    let now = Utc::now();
    EventItem {
        id: Uuid::now_v7(),
        event_id,
        description: "potato salad".to_string(),
        created: now,
        last_modified: now,
    }
}

pub fn earmark(event_item_id: Uuid, user_id: Uuid) -> Earmark {
    let now = Utc::now();
    Earmark {
        id: Uuid::now_v7(),
        event_item_id,
        user_id,
        note: "the good recipe".to_string(),
        created: now,
        last_modified: now,
    }
}

pub fn notification(user_id: Uuid) -> Notification {
    Notification {
        id: Uuid::now_v7(),
        user_id,
        message: "something happened".to_string(),
        read: false,
        created: Utc::now(),
    }
}
