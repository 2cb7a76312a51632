use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

/// Per-source fetch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollState {
    Idle,
    Fetching,
}

/// Guards a source against overlapping fetches. A second cycle that finds
/// the gate taken is skipped, never queued.
#[derive(Debug, Default)]
pub(crate) struct FetchGate {
    fetching: AtomicBool,
}

impl FetchGate {
    pub(crate) fn try_begin(self: &Arc<Self>) -> Option<FetchPermit> {
        self.fetching
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FetchPermit {
                gate: Arc::clone(self),
            })
    }

    pub(crate) fn state(&self) -> PollState {
        if self.fetching.load(Ordering::Acquire) {
            PollState::Fetching
        } else {
            PollState::Idle
        }
    }
}

/// Held for the duration of one fetch. Returns the gate to `Idle` on drop,
/// whether the cycle succeeded, failed or was abandoned.
#[derive(Debug)]
pub(crate) struct FetchPermit {
    gate: Arc<FetchGate>,
}

impl Drop for FetchPermit {
    fn drop(&mut self) {
        self.gate.fetching.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_is_refused_until_release() {
        let gate = Arc::new(FetchGate::default());
        let permit = gate.try_begin().unwrap();
        assert_eq!(gate.state(), PollState::Fetching);
        assert!(gate.try_begin().is_none());

        drop(permit);
        assert_eq!(gate.state(), PollState::Idle);
        assert!(gate.try_begin().is_some());
    }
}
