use std::fmt;

use beacon_protocol::{Category, PollSource};
use serde::Serialize;

use super::snapshot::SnapshotKind;

/// How "new" is decided for a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangePolicy {
    /// Items created strictly after the last seen timestamp are new.
    TimestampDiff,
    /// New is the growth of a cardinality since the last poll.
    CountDiff,
    /// The remote side decides; only rising edges are forwarded.
    BooleanWindow,
}

impl ChangePolicy {
    /// The policy every source is registered with.
    pub fn for_source(source: PollSource) -> Self {
        match source {
            PollSource::Category(Category::Returns) => ChangePolicy::TimestampDiff,
            PollSource::Category(Category::Warehouse | Category::Users | Category::Suppliers) => {
                ChangePolicy::CountDiff
            }
            PollSource::Category(Category::Reports | Category::Logs) | PollSource::SystemUpdates => {
                ChangePolicy::BooleanWindow
            }
        }
    }

    pub fn expected_kind(self) -> SnapshotKind {
        match self {
            ChangePolicy::TimestampDiff => SnapshotKind::Timestamped,
            ChangePolicy::CountDiff => SnapshotKind::Count,
            ChangePolicy::BooleanWindow => SnapshotKind::Verdict,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChangePolicy::TimestampDiff => "timestamp_diff",
            ChangePolicy::CountDiff => "count_diff",
            ChangePolicy::BooleanWindow => "boolean_window",
        }
    }
}

impl fmt::Display for ChangePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
