//! # ReminderScheduler
//!
//! One scheduler cycle loads every (user, event) pair still owed a reminder,
//! filters it against the user's lead-time preference, renders and sends the
//! mail, and writes the dedup marker so the pair is never picked up again.
//!
//! Any error aborts the cycle; already-sent reminders keep their markers, so
//! the next cycle resumes exactly where this one stopped.

use std::sync::Arc;

use askama::Template;
use chrono::Duration;
use domains::error::{Error, Result};
use domains::models::{Earmark, EventItem};
use domains::ports::{
    Clock, EarmarkRepo, EventItemRepo, EventRepo, Mail, MailSender, ReminderRepo, UserRepo,
};

const REMINDER_SUBJECT: &str = "Upcoming Event Reminder";

/// Outbound message stream tag, understood by the mail provider.
const MESSAGE_STREAM_HEADER: (&str, &str) = ("X-PM-Message-Stream", "broadcast");

/// One earmarked item as shown in the mail body.
struct ReminderItem {
    description: String,
    note: String,
}

#[derive(Template)]
#[template(path = "mail_reminder.txt")]
struct ReminderMailPlain<'a> {
    user_name: &'a str,
    owner: bool,
    event_name: &'a str,
    event_description: &'a str,
    event_when: &'a str,
    event_tz: &'a str,
    event_url: &'a str,
    items: &'a [ReminderItem],
}

#[derive(Template)]
#[template(path = "mail_reminder.html")]
struct ReminderMailHtml<'a> {
    user_name: &'a str,
    owner: bool,
    event_name: &'a str,
    event_description: &'a str,
    event_when: &'a str,
    event_tz: &'a str,
    event_url: &'a str,
    items: &'a [ReminderItem],
}

pub struct ReminderScheduler {
    reminders: Arc<dyn ReminderRepo>,
    users: Arc<dyn UserRepo>,
    events: Arc<dyn EventRepo>,
    items: Arc<dyn EventItemRepo>,
    earmarks: Arc<dyn EarmarkRepo>,
    mailer: Arc<dyn MailSender>,
    clock: Arc<dyn Clock>,
    base_url: String,
}

impl ReminderScheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reminders: Arc<dyn ReminderRepo>,
        users: Arc<dyn UserRepo>,
        events: Arc<dyn EventRepo>,
        items: Arc<dyn EventItemRepo>,
        earmarks: Arc<dyn EarmarkRepo>,
        mailer: Arc<dyn MailSender>,
        clock: Arc<dyn Clock>,
        base_url: impl Into<String>,
    ) -> Self {
        ReminderScheduler {
            reminders,
            users,
            events,
            items,
            earmarks,
            mailer,
            clock,
            base_url: base_url.into(),
        }
    }

    /// Runs one full cycle. Returns the number of reminders dispatched.
    pub async fn run(&self) -> Result<u64> {
        let candidates = self.reminders.candidates().await?;
        tracing::debug!(candidates = candidates.len(), "reminder selection loaded");

        let mut sent = 0u64;
        for candidate in candidates {
            let user = self.users.get(candidate.user_id).await?;
            if !user.settings.enable_reminders {
                continue;
            }

            let lead = Duration::hours(i64::from(user.settings.effective_threshold_hours()));
            let notify_when = self.clock.now() + lead;
            if notify_when < candidate.when {
                continue;
            }

            let event = self.events.get(candidate.event_id).await?;
            let mail_items = if candidate.item_ids.is_empty() {
                Vec::new()
            } else {
                let items = self.items.get_many(&candidate.item_ids).await?;
                let earmarks = self.earmarks.get_by_items(&candidate.item_ids).await?;
                merge_items(items, &earmarks)
            };

            let owner = user.id == event.user_id;
            let event_url = format!(
                "{}/events/{}",
                self.base_url.trim_end_matches('/'),
                event.id
            );
            let event_when = event.local_start().format("%Y-%m-%d %I:%M%p").to_string();
            let event_tz = event.tz.name();

            let body_plain = ReminderMailPlain {
                user_name: &user.name,
                owner,
                event_name: &event.name,
                event_description: &event.description,
                event_when: &event_when,
                event_tz,
                event_url: &event_url,
                items: &mail_items,
            }
            .render()
            .map_err(render_err)?;
            let body_html = ReminderMailHtml {
                user_name: &user.name,
                owner,
                event_name: &event.name,
                event_description: &event.description,
                event_when: &event_when,
                event_tz,
                event_url: &event_url,
                items: &mail_items,
            }
            .render()
            .map_err(render_err)?;

            self.mailer
                .send(Mail {
                    from: None,
                    to: vec![user.email.clone()],
                    subject: REMINDER_SUBJECT.to_string(),
                    body_plain,
                    body_html,
                    extra_headers: vec![(
                        MESSAGE_STREAM_HEADER.0.to_string(),
                        MESSAGE_STREAM_HEADER.1.to_string(),
                    )],
                })
                .await?;

            self.reminders
                .create_marker(candidate.user_id, candidate.event_id)
                .await?;
            tracing::info!(
                user_id = %candidate.user_id,
                event_id = %candidate.event_id,
                "reminder sent",
            );
            sent += 1;
        }
        Ok(sent)
    }
}

fn render_err(err: askama::Error) -> Error {
    tracing::error!(error = %err, "reminder template render failed");
    Error::internal("template render failed")
}

fn merge_items(items: Vec<EventItem>, earmarks: &[Earmark]) -> Vec<ReminderItem> {
    items
        .into_iter()
        .map(|item| {
            let note = earmarks
                .iter()
                .find(|em| em.event_item_id == item.id)
                .map(|em| em.note.clone())
                .unwrap_or_default();
            ReminderItem {
                description: item.description,
                note,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{earmark, event, item, user};
    use chrono::{Duration, Utc};
    use domains::models::{ReminderCandidate, UserEventNotification};
    use domains::ports::{
        MockClock, MockEarmarkRepo, MockEventItemRepo, MockEventRepo, MockMailSender,
        MockReminderRepo, MockUserRepo,
    };
    use mockall::predicate::eq;
    use uuid::Uuid;

    struct Mocks {
        reminders: MockReminderRepo,
        users: MockUserRepo,
        events: MockEventRepo,
        items: MockEventItemRepo,
        earmarks: MockEarmarkRepo,
        mailer: MockMailSender,
        clock: MockClock,
    }

    impl Mocks {
        fn new() -> Self {
            let mut clock = MockClock::new();
            clock.expect_now().return_const(Utc::now());
            Mocks {
                reminders: MockReminderRepo::new(),
                users: MockUserRepo::new(),
                events: MockEventRepo::new(),
                items: MockEventItemRepo::new(),
                earmarks: MockEarmarkRepo::new(),
                mailer: MockMailSender::new(),
                clock,
            }
        }

        fn scheduler(self) -> ReminderScheduler {
            ReminderScheduler::new(
                Arc::new(self.reminders),
                Arc::new(self.users),
                Arc::new(self.events),
                Arc::new(self.items),
                Arc::new(self.earmarks),
                Arc::new(self.mailer),
                Arc::new(self.clock),
                "https://example.com/",
            )
        }
    }

    fn candidate(user_id: Uuid, event_id: Uuid, in_hours: i64) -> ReminderCandidate {
        ReminderCandidate {
            user_id,
            event_id,
            when: Utc::now() + Duration::hours(in_hours),
            item_ids: vec![],
        }
    }

    #[tokio::test]
    async fn owner_reminder_sent_once_with_marker() {
        let owner = user(true);
        let mut ev = event(owner.id, false);
        ev.start_time = Utc::now() + Duration::hours(3);
        let owner_id = owner.id;
        let ev_id = ev.id;
        let owner_email = owner.email.clone();

        let mut mocks = Mocks::new();
        mocks
            .reminders
            .expect_candidates()
            .returning(move || Ok(vec![candidate(owner_id, ev_id, 3)]));
        mocks
            .users
            .expect_get()
            .with(eq(owner_id))
            .returning(move |_| Ok(owner.clone()));
        mocks
            .events
            .expect_get()
            .with(eq(ev_id))
            .returning(move |_| Ok(ev.clone()));
        mocks
            .mailer
            .expect_send()
            .times(1)
            .withf(move |mail| {
                mail.to == vec![owner_email.clone()]
                    && mail.subject == "Upcoming Event Reminder"
                    && mail.from.is_none()
                    && mail
                        .extra_headers
                        .contains(&("X-PM-Message-Stream".to_string(), "broadcast".to_string()))
                    && mail.body_plain.contains("Your event")
                    && mail.body_html.contains("Spring Picnic")
            })
            .returning(|_| Ok(()));
        mocks
            .reminders
            .expect_create_marker()
            .times(1)
            .with(eq(owner_id), eq(ev_id))
            .returning(|user_id, event_id| {
                Ok(UserEventNotification {
                    user_id,
                    event_id,
                    created: Utc::now(),
                })
            });

        let sent = mocks.scheduler().run().await.unwrap();
        assert_eq!(sent, 1);
    }

    #[tokio::test]
    async fn rerun_with_no_candidates_sends_nothing() {
        let mut mocks = Mocks::new();
        mocks.reminders.expect_candidates().returning(|| Ok(vec![]));
        // no mailer or marker expectations
        let sent = mocks.scheduler().run().await.unwrap();
        assert_eq!(sent, 0);
    }

    #[tokio::test]
    async fn event_outside_lead_time_is_skipped() {
        let recipient = user(true); // default threshold 24h
        let owner = user(true);
        let ev = event(owner.id, false);
        let recipient_id = recipient.id;
        let ev_id = ev.id;

        let mut mocks = Mocks::new();
        mocks
            .reminders
            .expect_candidates()
            .returning(move || Ok(vec![candidate(recipient_id, ev_id, 72)]));
        mocks
            .users
            .expect_get()
            .returning(move |_| Ok(recipient.clone()));
        // far outside the 24h window: no event fetch, no mail, no marker
        let sent = mocks.scheduler().run().await.unwrap();
        assert_eq!(sent, 0);
    }

    #[tokio::test]
    async fn disabled_reminders_are_skipped() {
        let mut recipient = user(true);
        recipient.settings.enable_reminders = false;
        let recipient_id = recipient.id;

        let mut mocks = Mocks::new();
        mocks
            .reminders
            .expect_candidates()
            .returning(move || Ok(vec![candidate(recipient_id, Uuid::now_v7(), 3)]));
        mocks
            .users
            .expect_get()
            .returning(move |_| Ok(recipient.clone()));
        let sent = mocks.scheduler().run().await.unwrap();
        assert_eq!(sent, 0);
    }

    #[tokio::test]
    async fn earmarker_mail_lists_claimed_items() {
        let claimant = user(true);
        let owner = user(true);
        let mut ev = event(owner.id, false);
        ev.start_time = Utc::now() + Duration::hours(3);
        let it = item(ev.id);
        let em = earmark(it.id, claimant.id);
        let claimant_id = claimant.id;
        let ev_id = ev.id;
        let it_id = it.id;

        let mut mocks = Mocks::new();
        mocks.reminders.expect_candidates().returning(move || {
            Ok(vec![ReminderCandidate {
                user_id: claimant_id,
                event_id: ev_id,
                when: Utc::now() + Duration::hours(3),
                item_ids: vec![it_id],
            }])
        });
        mocks
            .users
            .expect_get()
            .returning(move |_| Ok(claimant.clone()));
        mocks.events.expect_get().returning(move |_| Ok(ev.clone()));
        mocks
            .items
            .expect_get_many()
            .withf(move |ids| ids == [it_id])
            .returning(move |_| Ok(vec![it.clone()]));
        mocks
            .earmarks
            .expect_get_by_items()
            .returning(move |_| Ok(vec![em.clone()]));
        mocks
            .mailer
            .expect_send()
            .times(1)
            .withf(|mail| {
                mail.body_plain.contains("potato salad")
                    && mail.body_plain.contains("the good recipe")
                    && mail.body_plain.contains("earmarked items for")
            })
            .returning(|_| Ok(()));
        mocks
            .reminders
            .expect_create_marker()
            .returning(|user_id, event_id| {
                Ok(UserEventNotification {
                    user_id,
                    event_id,
                    created: Utc::now(),
                })
            });

        let sent = mocks.scheduler().run().await.unwrap();
        assert_eq!(sent, 1);
    }

    #[tokio::test]
    async fn mailer_failure_aborts_cycle_without_marker() {
        let owner = user(true);
        let mut ev = event(owner.id, false);
        ev.start_time = Utc::now() + Duration::hours(3);
        let owner_id = owner.id;
        let ev_id = ev.id;

        let mut mocks = Mocks::new();
        mocks
            .reminders
            .expect_candidates()
            .returning(move || Ok(vec![candidate(owner_id, ev_id, 3)]));
        mocks
            .users
            .expect_get()
            .returning(move |_| Ok(owner.clone()));
        mocks.events.expect_get().returning(move |_| Ok(ev.clone()));
        mocks
            .mailer
            .expect_send()
            .returning(|_| Err(Error::internal("smtp connect failed")));
        // marker must not be written when dispatch failed

        let err = mocks.scheduler().run().await.unwrap_err();
        assert_eq!(err.kind(), domains::error::ErrorKind::Internal);
    }
}
