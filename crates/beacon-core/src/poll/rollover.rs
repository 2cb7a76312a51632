use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Inclusive date range the dashboard's lists are filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Re-baselines the "today" range when the local date changes.
///
/// A range the user picked explicitly is left alone across midnight; only
/// the default single-day range moves with the calendar.
#[derive(Debug)]
pub struct DateRangeTracker {
    today: Mutex<NaiveDate>,
    tx: watch::Sender<DateRange>,
}

impl DateRangeTracker {
    pub fn new(today: NaiveDate) -> Self {
        let (tx, _rx) = watch::channel(DateRange::day(today));
        Self {
            today: Mutex::new(today),
            tx,
        }
    }

    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn current(&self) -> DateRange {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<DateRange> {
        self.tx.subscribe()
    }

    /// Replace the range with one the user picked.
    pub fn set_range(&self, range: DateRange) {
        self.tx.send_if_modified(|current| {
            let changed = *current != range;
            *current = range;
            changed
        });
    }

    /// Record the current local date. Returns true when the range moved.
    pub fn observe(&self, today: NaiveDate) -> bool {
        let mut last = self.today.lock().unwrap_or_else(PoisonError::into_inner);
        if *last == today {
            return false;
        }
        let follows_today = self.current() == DateRange::day(*last);
        *last = today;
        if !follows_today {
            return false;
        }

        self.tx.send_replace(DateRange::day(today));
        info!(event = "core.poll.rollover_completed", today = %today);
        true
    }

    /// Check the local date every `period` until `token` is cancelled.
    pub fn spawn(self: Arc<Self>, period: Duration, token: CancellationToken) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        self.observe(Local::now().date_naive());
                    }
                }
            }
        });
    }
}
