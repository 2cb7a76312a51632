//! Per-policy cursors and the diff each policy performs against them.
//!
//! Every diff takes the previous cursor (absent on the first poll) and the
//! fresh observation, and returns the delta together with the cursor to
//! store. Callers only store the cursor after a successful fetch.

use std::collections::BTreeMap;

use beacon_protocol::{PollSource, ResourceCount, UpdateVerdict};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::snapshot::TimestampedItem;
use crate::state::{Counter, Delta, SubItemDelta};

/// Last observed reference point of one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PollCursor {
    /// Newest `created_at` seen so far. `None` once the baseline ran on an
    /// empty snapshot.
    Timestamp {
        last_checked_at: Option<DateTime<Utc>>,
    },
    Count {
        last_data_count: u64,
        sub_counts: BTreeMap<String, u64>,
    },
    /// The verdict last reported, per slice and sub-item.
    Verdict {
        own: Counter,
        sub_items: BTreeMap<String, Counter>,
    },
}

fn saturating_sum(values: impl Iterator<Item = u64>) -> u64 {
    values.fold(0u64, |acc, v| acc.saturating_add(v))
}

pub(super) fn timestamp_diff(
    source: PollSource,
    prev: Option<&PollCursor>,
    items: &[TimestampedItem],
) -> (Delta, PollCursor) {
    let threshold = match prev {
        Some(PollCursor::Timestamp { last_checked_at }) => Some(*last_checked_at),
        _ => None,
    };
    let baseline = threshold.is_none();
    let threshold = threshold.flatten();

    let mut delta = Delta {
        baseline,
        ..Delta::empty(source)
    };
    let mut newest = threshold;

    for item in items {
        newest = newest.max(Some(item.created_at));
        let is_new = match threshold {
            Some(last) => item.created_at > last,
            None => true,
        };
        if !is_new {
            continue;
        }
        match &item.sub_item {
            Some(name) => {
                let sub = delta.sub_items.entry(name.clone()).or_default();
                sub.count += 1;
                sub.has_updates = !baseline;
            }
            None => delta.count += 1,
        }
    }
    delta.has_updates = !baseline && delta.count > 0;

    (
        delta,
        PollCursor::Timestamp {
            last_checked_at: newest,
        },
    )
}

pub(super) fn count_diff(
    source: PollSource,
    prev: Option<&PollCursor>,
    snapshot: &ResourceCount,
) -> (Delta, PollCursor) {
    let own_now = snapshot
        .count
        .saturating_sub(saturating_sum(snapshot.breakdown.values().copied()));
    let mut delta = Delta::empty(source);

    match prev {
        Some(PollCursor::Count {
            last_data_count,
            sub_counts,
        }) => {
            // Growth is attributed to sub-items first, then to the category's
            // own part, never beyond what the total grew by. A breakdown that
            // only moves between keys reports nothing.
            let mut budget = snapshot.count.saturating_sub(*last_data_count);
            for (name, now) in &snapshot.breakdown {
                let last = sub_counts.get(name).copied().unwrap_or(0);
                let grown = now.saturating_sub(last).min(budget);
                if grown > 0 {
                    budget -= grown;
                    delta.sub_items.insert(
                        name.clone(),
                        SubItemDelta {
                            count: grown,
                            has_updates: true,
                        },
                    );
                }
            }
            let own_last =
                last_data_count.saturating_sub(saturating_sum(sub_counts.values().copied()));
            delta.count = own_now.saturating_sub(own_last).min(budget);
            delta.has_updates = delta.count > 0;
        }
        _ => {
            delta.baseline = true;
            delta.count = own_now;
            for (name, count) in &snapshot.breakdown {
                delta.sub_items.insert(
                    name.clone(),
                    SubItemDelta {
                        count: *count,
                        has_updates: false,
                    },
                );
            }
        }
    }

    (
        delta,
        PollCursor::Count {
            last_data_count: snapshot.count,
            sub_counts: snapshot.breakdown.clone(),
        },
    )
}

/// Split a verdict into the slice's own part and its sub-items.
///
/// The own flag is only set when no sub-item accounts for the verdict. The
/// system slice has no sub-items, so its breakdown is folded into it.
fn observe_verdict(
    source: PollSource,
    verdict: &UpdateVerdict,
) -> (Counter, BTreeMap<String, Counter>) {
    let sub_sum = saturating_sum(verdict.breakdown.values().map(|r| r.count));

    if source == PollSource::SystemUpdates {
        let own = Counter {
            count: verdict.count.unwrap_or(sub_sum),
            has_updates: verdict.has_updates,
        };
        return (own, BTreeMap::new());
    }

    let explained = verdict.breakdown.values().any(|r| r.has_updates);
    let own = Counter {
        count: verdict.count.map_or(0, |c| c.saturating_sub(sub_sum)),
        has_updates: verdict.has_updates && !explained,
    };
    let subs = verdict
        .breakdown
        .iter()
        .map(|(name, r)| {
            (
                name.clone(),
                Counter {
                    count: r.count,
                    has_updates: r.has_updates,
                },
            )
        })
        .collect();
    (own, subs)
}

/// Growth since `last`. Flags fire on a rising edge, or when the count grows
/// while the flag is still up.
fn edge(last: Counter, now: Counter) -> SubItemDelta {
    let grown = now.count.saturating_sub(last.count);
    SubItemDelta {
        count: grown,
        has_updates: now.has_updates && (!last.has_updates || grown > 0),
    }
}

pub(super) fn verdict_diff(
    source: PollSource,
    prev: Option<&PollCursor>,
    verdict: &UpdateVerdict,
) -> (Delta, PollCursor) {
    let (own_now, subs_now) = observe_verdict(source, verdict);
    let mut delta = Delta::empty(source);

    match prev {
        Some(PollCursor::Verdict { own, sub_items }) => {
            let own_edge = edge(*own, own_now);
            delta.count = own_edge.count;
            delta.has_updates = own_edge.has_updates;
            for (name, now) in &subs_now {
                let last = sub_items.get(name).copied().unwrap_or_default();
                let sub_edge = edge(last, *now);
                if !sub_edge.is_noop() {
                    delta.sub_items.insert(name.clone(), sub_edge);
                }
            }
        }
        _ => {
            // The window is already evaluated remotely, so the first verdict
            // is forwarded whole. It still counts as a baseline for alerts.
            delta.baseline = true;
            delta.count = own_now.count;
            delta.has_updates = own_now.has_updates;
            for (name, now) in &subs_now {
                delta.sub_items.insert(
                    name.clone(),
                    SubItemDelta {
                        count: now.count,
                        has_updates: now.has_updates,
                    },
                );
            }
        }
    }

    (
        delta,
        PollCursor::Verdict {
            own: own_now,
            sub_items: subs_now,
        },
    )
}
