use std::fmt;

use beacon_protocol::{ResourceCount, UpdateVerdict};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One item of a timestamp-diffable category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampedItem {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// Sub-item the item is counted under. `None` counts toward the category itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_item: Option<String>,
}

/// What a fetcher observed, typed by the shape the remote side exposes.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Timestamped(Vec<TimestampedItem>),
    Count(ResourceCount),
    Verdict(UpdateVerdict),
}

impl Snapshot {
    pub fn kind(&self) -> SnapshotKind {
        match self {
            Snapshot::Timestamped(_) => SnapshotKind::Timestamped,
            Snapshot::Count(_) => SnapshotKind::Count,
            Snapshot::Verdict(_) => SnapshotKind::Verdict,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    Timestamped,
    Count,
    Verdict,
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SnapshotKind::Timestamped => "timestamped items",
            SnapshotKind::Count => "count",
            SnapshotKind::Verdict => "update verdict",
        };
        f.write_str(name)
    }
}
