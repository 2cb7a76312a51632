//! Change detection: turning a fresh snapshot into a delta.
//!
//! Each source carries one [`PollCursor`], shaped by the source's
//! [`ChangePolicy`]. The first observation of a source is a baseline: the
//! cursor is seeded and the delta is flagged so no alert fires for it.

mod cursor;
mod policy;
mod snapshot;

use std::collections::HashMap;

use beacon_protocol::PollSource;
use tracing::debug;

use crate::fetch::ParseError;
use crate::state::Delta;

pub use cursor::PollCursor;
pub use policy::ChangePolicy;
pub use snapshot::{Snapshot, SnapshotKind, TimestampedItem};

#[derive(Debug, Default)]
pub struct ChangeDetector {
    cursors: HashMap<PollSource, PollCursor>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `snapshot` to the stored cursor for `source` and advance it.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::PolicyMismatch`] when the snapshot's shape does
    /// not fit the source's policy. The cursor is left untouched in that case.
    pub fn detect(&mut self, source: PollSource, snapshot: &Snapshot) -> Result<Delta, ParseError> {
        let policy = ChangePolicy::for_source(source);
        let prev = self.cursors.get(&source);

        let (delta, next) = match (policy, snapshot) {
            (ChangePolicy::TimestampDiff, Snapshot::Timestamped(items)) => {
                cursor::timestamp_diff(source, prev, items)
            }
            (ChangePolicy::CountDiff, Snapshot::Count(count)) => {
                cursor::count_diff(source, prev, count)
            }
            (ChangePolicy::BooleanWindow, Snapshot::Verdict(verdict)) => {
                cursor::verdict_diff(source, prev, verdict)
            }
            (policy, other) => {
                return Err(ParseError::PolicyMismatch {
                    slice: source,
                    expected: policy.expected_kind(),
                    found: other.kind(),
                });
            }
        };
        self.cursors.insert(source, next);

        debug!(
            event = "core.detect.delta_computed",
            source = %source,
            policy = %policy,
            count = delta.total(),
            has_updates = delta.has_updates,
            baseline = delta.baseline,
        );
        Ok(delta)
    }

    pub fn cursor(&self, source: PollSource) -> Option<&PollCursor> {
        self.cursors.get(&source)
    }

    /// Replace the cursor for a source, e.g. to resume from a known point.
    pub fn set_cursor(&mut self, source: PollSource, cursor: PollCursor) {
        self.cursors.insert(source, cursor);
    }

    /// Forget a source so its next observation is a baseline again.
    pub fn reset(&mut self, source: PollSource) {
        self.cursors.remove(&source);
    }
}
