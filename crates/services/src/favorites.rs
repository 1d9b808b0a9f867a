//! # FavoriteService
//!
//! Bookmarking other users' events. Owners cannot favorite their own events,
//! and at most one favorite exists per (user, event) pair.

use std::sync::Arc;

use domains::error::{Error, ErrorKind, Result};
use domains::models::Event;
use domains::ports::{EventRepo, FavoriteRepo};
use uuid::Uuid;

pub struct FavoriteService {
    favorites: Arc<dyn FavoriteRepo>,
    events: Arc<dyn EventRepo>,
}

impl FavoriteService {
    pub fn new(favorites: Arc<dyn FavoriteRepo>, events: Arc<dyn EventRepo>) -> Self {
        FavoriteService { favorites, events }
    }

    /// Bookmarks an event for `user_id` and hands back the event so callers
    /// can render it without a second lookup.
    pub async fn add_favorite(&self, user_id: Uuid, event_id: Uuid) -> Result<Event> {
        let event = self.events.get(event_id).await?;
        if event.user_id == user_id {
            return Err(Error::permission_denied("can't favorite own event"));
        }

        match self.favorites.get_by_user_event(user_id, event.id).await {
            Ok(_) => return Err(Error::already_exists("favorite already exists")),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }

        self.favorites.create(user_id, event.id).await?;
        Ok(event)
    }

    pub async fn remove_favorite(&self, user_id: Uuid, event_id: Uuid) -> Result<()> {
        let event = self.events.get(event_id).await?;
        let favorite = self.favorites.get_by_user_event(user_id, event.id).await?;
        if favorite.user_id != user_id {
            return Err(Error::permission_denied("permission denied"));
        }
        self.favorites.delete(favorite.id).await
    }

    pub async fn list_favorite_events(
        &self,
        user_id: Uuid,
        limit: u32,
        offset: u32,
        archived: bool,
    ) -> Result<Vec<Event>> {
        self.favorites
            .list_events_by_user(user_id, limit, offset, archived)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{event, user};
    use chrono::Utc;
    use domains::models::Favorite;
    use domains::ports::{MockEventRepo, MockFavoriteRepo};
    use mockall::predicate::eq;

    fn favorite(user_id: Uuid, event_id: Uuid) -> Favorite {
        Favorite {
            id: Uuid::now_v7(),
            user_id,
            event_id,
            created: Utc::now(),
        }
    }

    #[tokio::test]
    async fn add_favorite_rejects_own_event() {
        let owner = user(true);
        let ev = event(owner.id, false);
        let ev_id = ev.id;
        let mut events = MockEventRepo::new();
        events.expect_get().returning(move |_| Ok(ev.clone()));
        let svc = FavoriteService::new(Arc::new(MockFavoriteRepo::new()), Arc::new(events));
        let err = svc.add_favorite(owner.id, ev_id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert_eq!(err.to_string(), "can't favorite own event");
    }

    #[tokio::test]
    async fn add_favorite_rejects_duplicate() {
        let owner = user(true);
        let fan = user(true);
        let ev = event(owner.id, false);
        let ev_id = ev.id;
        let existing = favorite(fan.id, ev_id);

        let mut events = MockEventRepo::new();
        events.expect_get().returning(move |_| Ok(ev.clone()));
        let mut favorites = MockFavoriteRepo::new();
        favorites
            .expect_get_by_user_event()
            .returning(move |_, _| Ok(existing.clone()));

        let svc = FavoriteService::new(Arc::new(favorites), Arc::new(events));
        let err = svc.add_favorite(fan.id, ev_id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(err.to_string(), "favorite already exists");
    }

    #[tokio::test]
    async fn add_favorite_returns_the_event() {
        let owner = user(true);
        let fan = user(true);
        let ev = event(owner.id, false);
        let ev_id = ev.id;
        let fan_id = fan.id;

        let mut events = MockEventRepo::new();
        let ev_for_get = ev.clone();
        events
            .expect_get()
            .returning(move |_| Ok(ev_for_get.clone()));
        let mut favorites = MockFavoriteRepo::new();
        favorites
            .expect_get_by_user_event()
            .returning(|_, _| Err(Error::not_found("favorite not found")));
        favorites
            .expect_create()
            .with(eq(fan_id), eq(ev_id))
            .returning(|user_id, event_id| Ok(favorite(user_id, event_id)));

        let svc = FavoriteService::new(Arc::new(favorites), Arc::new(events));
        let got = svc.add_favorite(fan.id, ev_id).await.unwrap();
        assert_eq!(got.id, ev.id);
        assert_eq!(got.name, ev.name);
    }

    #[tokio::test]
    async fn remove_favorite_missing_bookmark() {
        let owner = user(true);
        let fan = user(true);
        let ev = event(owner.id, false);
        let ev_id = ev.id;

        let mut events = MockEventRepo::new();
        events.expect_get().returning(move |_| Ok(ev.clone()));
        let mut favorites = MockFavoriteRepo::new();
        favorites
            .expect_get_by_user_event()
            .returning(|_, _| Err(Error::not_found("favorite not found")));

        let svc = FavoriteService::new(Arc::new(favorites), Arc::new(events));
        let err = svc.remove_favorite(fan.id, ev_id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "favorite not found");
    }

    #[tokio::test]
    async fn remove_favorite_deletes_by_id() {
        let owner = user(true);
        let fan = user(true);
        let ev = event(owner.id, false);
        let ev_id = ev.id;
        let fav = favorite(fan.id, ev_id);
        let fav_id = fav.id;

        let mut events = MockEventRepo::new();
        events.expect_get().returning(move |_| Ok(ev.clone()));
        let mut favorites = MockFavoriteRepo::new();
        favorites
            .expect_get_by_user_event()
            .returning(move |_, _| Ok(fav.clone()));
        favorites
            .expect_delete()
            .with(eq(fav_id))
            .returning(|_| Ok(()));

        let svc = FavoriteService::new(Arc::new(favorites), Arc::new(events));
        svc.remove_favorite(fan.id, ev_id).await.unwrap();
    }
}
