use std::sync::Arc;

use beacon_protocol::Category;
use tokio::sync::watch;
use tracing::debug;

use super::events::Event;
use super::reducer::reduce;
use super::types::{Command, Delta, NotificationState};

/// The process-wide notification store.
///
/// Cloning is cheap and every clone shares the same state. Writes go through
/// [`dispatch`](Self::dispatch), which runs the pure reducer while holding the
/// channel's write lock, so concurrent callers are serialized and never lose
/// an update. Readers either take a [`snapshot`](Self::snapshot) or
/// [`subscribe`](Self::subscribe) for change notifications.
#[derive(Debug, Clone)]
pub struct NotificationStore {
    tx: Arc<watch::Sender<NotificationState>>,
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(NotificationState::new());
        Self { tx: Arc::new(tx) }
    }

    /// Apply a command and return what changed.
    ///
    /// Subscribers are only woken when the state actually changes.
    pub fn dispatch(&self, cmd: Command) -> Vec<Event> {
        let mut events = Vec::new();
        self.tx.send_if_modified(|state| {
            let (next, changed) = reduce(state, &cmd);
            if changed.is_empty() {
                return false;
            }
            *state = next;
            events = changed;
            true
        });

        debug!(
            event = "core.store.dispatch_completed",
            command = ?cmd,
            events = events.len(),
        );
        events
    }

    pub fn apply_delta(&self, delta: Delta) -> Vec<Event> {
        self.dispatch(Command::ApplyDelta(delta))
    }

    /// Zero a category, or just one of its sub-items. The only writer that
    /// may lower a count.
    pub fn mark_viewed(&self, category: Category, sub_item: Option<&str>) -> Vec<Event> {
        self.dispatch(Command::MarkViewed {
            category,
            sub_item: sub_item.map(str::to_string),
        })
    }

    pub fn mark_system_viewed(&self) -> Vec<Event> {
        self.dispatch(Command::MarkSystemViewed)
    }

    pub fn get_total(&self, category: Category) -> u64 {
        self.tx.borrow().total(category)
    }

    pub fn has_any(&self) -> bool {
        self.tx.borrow().has_any()
    }

    /// A consistent copy of the whole tree.
    pub fn snapshot(&self) -> NotificationState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A presentation surface's view of the store. Dropping it unsubscribes.
#[derive(Debug, Clone)]
pub struct Subscription {
    rx: watch::Receiver<NotificationState>,
}

impl Subscription {
    /// Wait for the next change and return the state it produced.
    ///
    /// Intermediate states may be skipped when several writes land before
    /// the subscriber wakes. Returns `None` once every store handle is gone.
    pub async fn changed(&mut self) -> Option<NotificationState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    pub fn current(&self) -> NotificationState {
        self.rx.borrow().clone()
    }
}
