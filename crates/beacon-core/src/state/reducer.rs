//! Pure merge function behind the notification store.
//!
//! `reduce` never mutates its input. The store swaps the returned state in
//! under its single writer, so two deltas resolving in the same tick can
//! never interleave a read-modify-write.

use beacon_protocol::PollSource;

use super::events::Event;
use super::types::{Command, Counter, NotificationState};

/// Apply `cmd` to `state`, returning the next state and what changed.
///
/// An empty event list means the next state equals `state`.
pub fn reduce(state: &NotificationState, cmd: &Command) -> (NotificationState, Vec<Event>) {
    let mut next = state.clone();
    let events = match cmd {
        Command::ApplyDelta(delta) => {
            match delta.source {
                PollSource::Category(category) => {
                    let slice = next.category_mut(category);
                    slice.own.absorb(delta.count, delta.has_updates);
                    for (name, sub) in &delta.sub_items {
                        // A zero entry still registers the key so the panel can list it.
                        slice
                            .sub_items
                            .entry(name.clone())
                            .or_default()
                            .absorb(sub.count, sub.has_updates);
                    }
                }
                PollSource::SystemUpdates => {
                    // The system slice has no sub-items; fold them into its own count.
                    let flagged =
                        delta.has_updates || delta.sub_items.values().any(|sub| sub.has_updates);
                    next.system.absorb(delta.total(), flagged);
                }
            }
            if next == *state {
                Vec::new()
            } else {
                let (total, has_updates) = slice_summary(&next, delta.source);
                vec![Event::SliceUpdated {
                    source: delta.source,
                    total,
                    has_updates,
                }]
            }
        }
        Command::MarkViewed { category, sub_item } => {
            let slice = next.category_mut(*category);
            match sub_item {
                None => {
                    slice.own = Counter::default();
                    for counter in slice.sub_items.values_mut() {
                        *counter = Counter::default();
                    }
                }
                Some(name) => {
                    if let Some(counter) = slice.sub_items.get_mut(name) {
                        *counter = Counter::default();
                    }
                }
            }
            if next == *state {
                Vec::new()
            } else {
                vec![Event::SliceCleared {
                    source: PollSource::Category(*category),
                    sub_item: sub_item.clone(),
                }]
            }
        }
        Command::MarkSystemViewed => {
            next.system = Counter::default();
            if next == *state {
                Vec::new()
            } else {
                vec![Event::SliceCleared {
                    source: PollSource::SystemUpdates,
                    sub_item: None,
                }]
            }
        }
    };
    (next, events)
}

fn slice_summary(state: &NotificationState, source: PollSource) -> (u64, bool) {
    match source {
        PollSource::Category(category) => {
            let slice = state.category(category);
            (slice.total(), slice.has_updates())
        }
        PollSource::SystemUpdates => (state.system.count, state.system.has_updates),
    }
}
