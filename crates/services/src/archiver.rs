//! # Archiver
//!
//! Periodic sweep that flips stale events to archived. An event is stale one
//! full day after its start, compared at hour granularity so events never age
//! out mid-hour.

use std::sync::Arc;

use chrono::{DateTime, Duration, DurationRound, Utc};
use domains::error::Result;
use domains::ports::{Clock, EventRepo};

pub struct Archiver {
    events: Arc<dyn EventRepo>,
    clock: Arc<dyn Clock>,
}

impl Archiver {
    pub fn new(events: Arc<dyn EventRepo>, clock: Arc<dyn Clock>) -> Self {
        Archiver { events, clock }
    }

    /// Runs one sweep. Returns the number of events archived.
    pub async fn run(&self) -> Result<u64> {
        let cutoff = archive_cutoff(self.clock.now());
        let archived = self.events.archive_started_before(cutoff).await?;
        if archived > 0 {
            tracing::info!(archived, "stale events archived");
        }
        Ok(archived)
    }
}

/// The archival boundary for a sweep running at `now`: events get one full
/// day past their start before the sweep picks them up.
pub fn archive_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(1)
}

/// Whether an event that started at `start_time` counts as stale at `now`.
/// Mirrors the SQL sweep: the start is truncated to the hour first.
pub fn is_stale(start_time: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let start_hour = start_time
        .duration_trunc(Duration::hours(1))
        .unwrap_or(start_time);
    start_hour < archive_cutoff(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::ports::MockClock;
    use mockall::predicate::eq;

    #[test]
    fn two_day_old_event_is_stale() {
        let now = Utc::now();
        assert!(is_stale(now - Duration::days(2), now));
    }

    #[test]
    fn two_hour_old_event_is_not_stale() {
        let now = Utc::now();
        assert!(!is_stale(now - Duration::hours(2), now));
    }

    #[test]
    fn future_event_is_not_stale() {
        let now = Utc::now();
        assert!(!is_stale(now + Duration::hours(5), now));
    }

    #[tokio::test]
    async fn sweep_passes_cutoff_to_repo() {
        let now = Utc::now();
        let mut clock = MockClock::new();
        clock.expect_now().return_const(now);
        let mut events = domains::ports::MockEventRepo::new();
        events
            .expect_archive_started_before()
            .with(eq(archive_cutoff(now)))
            .returning(|_| Ok(4));

        let archiver = Archiver::new(Arc::new(events), Arc::new(clock));
        assert_eq!(archiver.run().await.unwrap(), 4);
    }
}
