//! Shared fixtures for the service-level integration tests.

use chrono::{Duration, Utc};
use domains::models::{Earmark, Event, EventItem, Notification, User, UserSettings};
use uuid::Uuid;

pub fn verified_user(email: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::now_v7(),
        email: email.to_string(),
        name: email.split('@').next().unwrap_or("someone").to_string(),
        pw_hash: "$argon2$fixture".to_string(),
        verified: true,
        settings: UserSettings::default(),
        created: now,
        last_modified: now,
    }
}

pub fn unverified_user(email: &str) -> User {
    User {
        verified: false,
        ..verified_user(email)
    }
}

pub fn upcoming_event(owner_id: Uuid, hours_from_now: i64) -> Event {
    let now = Utc::now();
    Event {
        id: Uuid::now_v7(),
        user_id: owner_id,
        name: "Block Party".to_string(),
        description: "Street closed, grills open".to_string(),
        start_time: now + Duration::hours(hours_from_now),
        tz: chrono_tz::America::Chicago,
        item_sort_order: vec![],
        archived: false,
        created: now,
        last_modified: now,
    }
}

pub fn archived_event(owner_id: Uuid) -> Event {
    Event {
        archived: true,
        ..upcoming_event(owner_id, -48)
    }
}

pub fn event_item(event_id: Uuid, description: &str) -> EventItem {
    let now = Utc::now();
    EventItem {
        id: Uuid::now_v7(),
        event_id,
        description: description.to_string(),
        created: now,
        last_modified: now,
    }
}

pub fn earmark_on(item_id: Uuid, user_id: Uuid) -> Earmark {
    let now = Utc::now();
    Earmark {
        id: Uuid::now_v7(),
        event_item_id: item_id,
        user_id,
        note: "got it covered".to_string(),
        created: now,
        last_modified: now,
    }
}

pub fn unread_notification(user_id: Uuid, message: &str) -> Notification {
    Notification {
        id: Uuid::now_v7(),
        user_id,
        message: message.to_string(),
        read: false,
        created: Utc::now(),
    }
}
