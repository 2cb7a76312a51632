use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::sink::SettingsSink;
use super::types::{PreferenceField, Preferences};

struct DebounceState {
    desired: Preferences,
    last_written: Preferences,
    pending: Option<CancellationToken>,
}

struct Shared {
    state: Mutex<DebounceState>,
    sinks: Vec<Arc<dyn SettingsSink>>,
}

impl Shared {
    fn lock(&self) -> std::sync::MutexGuard<'_, DebounceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write the desired preferences unless they match what was last written.
    fn write_settled(&self, state: &mut DebounceState) {
        state.pending = None;
        if state.desired == state.last_written {
            debug!(event = "core.settings.write_skipped", reason = "unchanged");
            return;
        }

        let mut failed = false;
        for sink in &self.sinks {
            if let Err(e) = sink.write(&state.desired) {
                failed = true;
                warn!(event = "core.settings.write_failed", error = %e);
            }
        }
        if !failed {
            state.last_written = state.desired.clone();
            debug!(event = "core.settings.write_completed");
        }
    }
}

/// Coalesces bursts of preference toggles into one write per sink.
///
/// Each change cancels the pending write and schedules a new one after the
/// quiet period. Dropping the debouncer cancels any pending write. Must be
/// used from within a tokio runtime.
pub struct SettingsDebouncer {
    shared: Arc<Shared>,
    quiet: Duration,
}

impl SettingsDebouncer {
    pub fn new(initial: Preferences, quiet: Duration, sinks: Vec<Arc<dyn SettingsSink>>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(DebounceState {
                    desired: initial.clone(),
                    last_written: initial,
                    pending: None,
                }),
                sinks,
            }),
            quiet,
        }
    }

    pub fn desired(&self) -> Preferences {
        self.shared.lock().desired.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.shared.lock().pending.is_some()
    }

    /// Flip a field and reschedule the write. Returns the new value.
    pub fn toggle(&self, field: PreferenceField) -> bool {
        let mut state = self.shared.lock();
        let value = state.desired.toggle(field);
        self.reschedule(&mut state);
        value
    }

    pub fn set(&self, field: PreferenceField, value: bool) {
        let mut state = self.shared.lock();
        state.desired.set(field, value);
        self.reschedule(&mut state);
    }

    /// Write now instead of waiting for the quiet period.
    pub fn flush(&self) {
        let mut state = self.shared.lock();
        if let Some(token) = state.pending.take() {
            token.cancel();
        }
        self.shared.write_settled(&mut state);
    }

    /// Drop the pending write without performing it.
    pub fn cancel(&self) {
        if let Some(token) = self.shared.lock().pending.take() {
            token.cancel();
            debug!(event = "core.settings.write_cancelled");
        }
    }

    fn reschedule(&self, state: &mut DebounceState) {
        if let Some(previous) = state.pending.take() {
            previous.cancel();
        }
        let token = CancellationToken::new();
        state.pending = Some(token.clone());

        let shared = Arc::clone(&self.shared);
        let quiet = self.quiet;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(quiet) => {
                    let mut state = shared.lock();
                    // A toggle may have landed between the timer firing and the lock.
                    if !token.is_cancelled() {
                        shared.write_settled(&mut state);
                    }
                }
            }
        });
    }
}

impl Drop for SettingsDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
