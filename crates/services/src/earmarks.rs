//! # EarmarkService
//!
//! Claiming and releasing event items. An item carries at most one earmark;
//! the storage layer backs that with a uniqueness constraint, and this layer
//! adds the friendlier pre-checks and the verified-account gate.

use std::sync::Arc;

use domains::error::{Error, ErrorKind, Result};
use domains::models::Earmark;
use domains::ports::{EarmarkRepo, EventItemRepo, EventRepo};
use domains::validate;
use domains::User;
use uuid::Uuid;

pub struct EarmarkService {
    earmarks: Arc<dyn EarmarkRepo>,
    items: Arc<dyn EventItemRepo>,
    events: Arc<dyn EventRepo>,
}

impl EarmarkService {
    pub fn new(
        earmarks: Arc<dyn EarmarkRepo>,
        items: Arc<dyn EventItemRepo>,
        events: Arc<dyn EventRepo>,
    ) -> Self {
        EarmarkService {
            earmarks,
            items,
            events,
        }
    }

    pub async fn create_earmark(&self, user: &User, item_id: Uuid, note: &str) -> Result<Earmark> {
        validate::not_blank("note", note)?;

        let item = self.items.get(item_id).await?;

        match self.earmarks.get_by_item(item.id).await {
            Ok(existing) if existing.user_id == user.id => {
                return Err(Error::already_exists("already earmarked"));
            }
            Ok(_) => {
                return Err(Error::already_exists("already earmarked by other user"));
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }

        let event = self.events.get_by_item(item.id).await?;
        if event.archived {
            return Err(Error::permission_denied("event is archived"));
        }
        if !user.verified {
            return Err(Error::permission_denied(
                "account must be verified before earmarking is allowed",
            ));
        }

        self.earmarks.create(item.id, user.id, note).await
    }

    pub async fn get_earmark(&self, earmark_id: Uuid) -> Result<Earmark> {
        self.earmarks.get(earmark_id).await
    }

    pub async fn list_earmarks(&self, user_id: Uuid, archived: bool) -> Result<Vec<Earmark>> {
        self.earmarks.list_by_user(user_id, archived).await
    }

    pub async fn update_earmark_note(
        &self,
        caller_id: Uuid,
        earmark_id: Uuid,
        note: &str,
    ) -> Result<Earmark> {
        let mut earmark = self.earmarks.get(earmark_id).await?;
        if earmark.user_id != caller_id {
            return Err(Error::permission_denied("permission denied"));
        }
        let event = self.events.get_by_item(earmark.event_item_id).await?;
        if event.archived {
            return Err(Error::permission_denied("event is archived"));
        }
        self.earmarks.update_note(earmark.id, note).await?;
        earmark.note = note.to_string();
        Ok(earmark)
    }

    /// Releases an already-loaded earmark. Only the claimant may release,
    /// and only while the event is live.
    pub async fn delete_earmark(&self, caller_id: Uuid, earmark: &Earmark) -> Result<()> {
        if earmark.user_id != caller_id {
            return Err(Error::permission_denied("permission denied"));
        }
        let event = self.events.get_by_item(earmark.event_item_id).await?;
        if event.archived {
            return Err(Error::permission_denied("event is archived"));
        }
        self.earmarks.delete(earmark.id).await
    }

    pub async fn delete_earmark_by_id(&self, caller_id: Uuid, earmark_id: Uuid) -> Result<()> {
        let earmark = self.earmarks.get(earmark_id).await?;
        self.delete_earmark(caller_id, &earmark).await
    }
}
