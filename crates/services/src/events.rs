//! # EventService
//!
//! Business rules for events and their items: input validation, ownership
//! and archival checks, and the earmark-exclusivity rule on item edits.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domains::error::{Error, ErrorKind, Result};
use domains::models::{Event, EventChanges, EventItem, Pagination};
use domains::ports::{EarmarkRepo, EventItemRepo, EventRepo};
use domains::validate;
use domains::User;
use uuid::Uuid;

/// Caller-supplied precondition hook; a `true` return fails the operation
/// with `FailedPrecondition`.
pub type FailIf<'a> = &'a (dyn Fn(&EventItem) -> bool + Send + Sync);

/// Partial update input; `tz` arrives unparsed from the transport layer.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub tz: Option<String>,
    pub item_sort_order: Option<Vec<Uuid>>,
}

pub struct EventService {
    events: Arc<dyn EventRepo>,
    items: Arc<dyn EventItemRepo>,
    earmarks: Arc<dyn EarmarkRepo>,
}

impl EventService {
    pub fn new(
        events: Arc<dyn EventRepo>,
        items: Arc<dyn EventItemRepo>,
        earmarks: Arc<dyn EarmarkRepo>,
    ) -> Self {
        EventService {
            events,
            items,
            earmarks,
        }
    }

    pub async fn create_event(
        &self,
        user: &User,
        name: &str,
        description: &str,
        start_time: DateTime<Utc>,
        tz: &str,
    ) -> Result<Event> {
        if !user.verified {
            return Err(Error::permission_denied(
                "account must be verified before event creation is allowed",
            ));
        }
        validate::not_blank("name", name)?;
        validate::not_blank("description", description)?;
        validate::start_time_set("start_time", start_time)?;
        let tz = validate::parse_timezone("tz", tz)?;

        self.events
            .create(user.id, name, description, start_time, tz)
            .await
    }

    pub async fn get_event(&self, event_id: Uuid) -> Result<Event> {
        self.events.get(event_id).await
    }

    pub async fn list_events(
        &self,
        user_id: Uuid,
        limit: u32,
        offset: u32,
        archived: bool,
    ) -> Result<(Vec<Event>, Pagination)> {
        let count = self.events.count_by_user(user_id, archived).await?;
        let events = if count > 0 {
            self.events
                .list_by_user(user_id, limit, offset, archived)
                .await?
        } else {
            Vec::new()
        };
        Ok((
            events,
            Pagination {
                limit,
                offset,
                count,
            },
        ))
    }

    pub async fn update_event(
        &self,
        caller_id: Uuid,
        event_id: Uuid,
        patch: EventPatch,
    ) -> Result<Event> {
        let mut event = self.events.get(event_id).await?;

        if caller_id != event.user_id {
            return Err(Error::permission_denied("not event owner"));
        }
        if event.archived {
            return Err(Error::permission_denied("event is archived"));
        }

        let changes = validate_patch(patch)?;
        self.events.update(event.id, changes.clone()).await?;
        changes.apply_to(&mut event);
        Ok(event)
    }

    pub async fn update_item_sorting(
        &self,
        caller_id: Uuid,
        event_id: Uuid,
        order: Vec<Uuid>,
    ) -> Result<Event> {
        let mut event = self.events.get(event_id).await?;

        if caller_id != event.user_id {
            return Err(Error::permission_denied("not event owner"));
        }
        if event.archived {
            return Err(Error::permission_denied("event is archived"));
        }
        if event.item_sort_order == order {
            return Err(Error::failed_precondition("no changes"));
        }

        let changes = EventChanges {
            item_sort_order: Some(order.clone()),
            ..Default::default()
        };
        self.events.update(event.id, changes).await?;
        event.item_sort_order = order;
        Ok(event)
    }

    /// Archived events may still be deleted by their owner.
    pub async fn delete_event(&self, caller_id: Uuid, event_id: Uuid) -> Result<()> {
        let event = self.events.get(event_id).await?;
        if caller_id != event.user_id {
            return Err(Error::permission_denied("not event owner"));
        }
        self.events.delete(event.id).await
    }

    pub async fn add_event_item(
        &self,
        caller_id: Uuid,
        event_id: Uuid,
        description: &str,
    ) -> Result<EventItem> {
        let event = self.events.get(event_id).await?;

        if caller_id != event.user_id {
            return Err(Error::permission_denied("not event owner"));
        }
        if event.archived {
            return Err(Error::permission_denied("event is archived"));
        }
        validate::not_blank("description", description)?;

        self.items.create(event.id, description).await
    }

    pub async fn remove_event_item(
        &self,
        caller_id: Uuid,
        item_id: Uuid,
        fail_if: Option<FailIf<'_>>,
    ) -> Result<()> {
        let item = self.items.get(item_id).await?;

        if let Some(check) = fail_if {
            if check(&item) {
                return Err(Error::failed_precondition("extra checks failed"));
            }
        }

        let event = self.events.get(item.event_id).await?;
        if caller_id != event.user_id {
            return Err(Error::permission_denied("not event owner"));
        }
        if event.archived {
            return Err(Error::permission_denied("event is archived"));
        }

        self.items.delete(item.id).await
    }

    /// Edits an item's description. Rejected when another user's earmark sits
    /// on the item, even for the event owner.
    pub async fn update_event_item(
        &self,
        caller_id: Uuid,
        item_id: Uuid,
        description: &str,
        fail_if: Option<FailIf<'_>>,
    ) -> Result<EventItem> {
        let mut item = self.items.get(item_id).await?;

        if let Some(check) = fail_if {
            if check(&item) {
                return Err(Error::failed_precondition("extra checks failed"));
            }
        }

        let event = self.events.get(item.event_id).await?;
        if caller_id != event.user_id {
            return Err(Error::permission_denied("not event owner"));
        }
        if event.archived {
            return Err(Error::permission_denied("event is archived"));
        }

        match self.earmarks.get_by_item(item.id).await {
            Ok(earmark) if earmark.user_id != caller_id => {
                tracing::info!(
                    caller_id = %caller_id,
                    earmark_user_id = %earmark.user_id,
                    "user id mismatch",
                );
                return Err(Error::permission_denied("earmarked by other user"));
            }
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }

        validate::not_blank("description", description)?;
        self.items.update_description(item.id, description).await?;
        item.description = description.to_string();
        Ok(item)
    }
}

fn validate_patch(patch: EventPatch) -> Result<EventChanges> {
    if patch.name.is_none()
        && patch.description.is_none()
        && patch.start_time.is_none()
        && patch.tz.is_none()
        && patch.item_sort_order.is_none()
    {
        return Err(Error::invalid_argument("missing fields"));
    }
    if let Some(ref name) = patch.name {
        validate::not_blank("name", name)?;
    }
    if let Some(ref description) = patch.description {
        validate::not_blank("description", description)?;
    }
    if let Some(start_time) = patch.start_time {
        validate::start_time_set("start_time", start_time)?;
    }
    if let Some(ref order) = patch.item_sort_order {
        if order.is_empty() {
            return Err(Error::invalid_field("item_sort_order", "bad value"));
        }
    }
    let tz = match patch.tz {
        Some(ref raw) => Some(validate::parse_timezone("tz", raw)?),
        None => None,
    };
    Ok(EventChanges {
        name: patch.name,
        description: patch.description,
        start_time: patch.start_time,
        tz,
        item_sort_order: patch.item_sort_order,
    })
}
