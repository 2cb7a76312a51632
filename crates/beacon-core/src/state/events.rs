use beacon_protocol::PollSource;
use serde::{Deserialize, Serialize};

/// State changes that resulted from a dispatched [`Command`](super::Command).
///
/// Each variant describes _what happened_. Commands that leave the state
/// untouched produce no events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A delta raised the count or flag of a slice.
    SliceUpdated {
        source: PollSource,
        total: u64,
        has_updates: bool,
    },
    /// A slice (or one sub-item of it) was zeroed by a view.
    SliceCleared {
        source: PollSource,
        sub_item: Option<String>,
    },
}
