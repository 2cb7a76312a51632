//! OS-level alerts for genuinely new notifications.
//!
//! Best-effort: the badge path never depends on this. Permission is requested
//! at most once per session; a denial is logged once and every later alert is
//! quietly dropped.

pub mod backends;
pub mod errors;
pub mod registry;
pub mod traits;

use std::sync::{Mutex, PoisonError};

use beacon_protocol::PollSource;
use serde::Serialize;
use tracing::{info, warn};

use crate::settings::SharedSettings;
use crate::state::Delta;

pub use errors::NotifyError;
pub use registry::NotificationRegistry;
pub use traits::{Alert, NotificationBackend};

/// Session permission to show OS alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Not requested yet.
    Default,
    Granted,
    Denied,
}

/// What happened to one delta on its way to the desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertOutcome {
    Sent,
    /// Baseline or flag-less delta.
    NotNew,
    /// `[alerts].enabled = false`.
    Disabled,
    /// The user's preferences mute this source.
    Muted,
    PermissionDenied,
    Failed,
}

struct PermissionState {
    permission: Permission,
    backend: Option<usize>,
}

pub struct AlertDispatcher {
    registry: NotificationRegistry,
    enabled: bool,
    settings: Option<SharedSettings>,
    permission: Mutex<PermissionState>,
}

impl AlertDispatcher {
    pub fn new(registry: NotificationRegistry, enabled: bool) -> Self {
        Self {
            registry,
            enabled,
            settings: None,
            permission: Mutex::new(PermissionState {
                permission: Permission::Default,
                backend: None,
            }),
        }
    }

    /// Consult the user's preferences before every alert.
    pub fn with_settings(mut self, settings: SharedSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn permission(&self) -> Permission {
        self.lock_permission().permission
    }

    pub fn dispatch(&self, delta: &Delta) -> AlertOutcome {
        if !delta.raises_alert() {
            return AlertOutcome::NotNew;
        }
        if !self.enabled {
            return AlertOutcome::Disabled;
        }
        let sound = match &self.settings {
            Some(settings) => {
                let prefs = settings.get();
                if !prefs.allows_alert(delta.source) {
                    return AlertOutcome::Muted;
                }
                prefs.alert_sound
            }
            None => false,
        };

        let Some(backend) = self.granted_backend() else {
            return AlertOutcome::PermissionDenied;
        };

        let (title, message) = format_alert(delta);
        let alert = Alert {
            title,
            message,
            sound,
        };
        match backend.send(&alert) {
            Ok(()) => {
                info!(
                    event = "core.notify.send_completed",
                    source = %delta.source,
                    backend = backend.name(),
                );
                AlertOutcome::Sent
            }
            Err(e) => {
                warn!(
                    event = "core.notify.send_failed",
                    source = %delta.source,
                    error = %e,
                );
                AlertOutcome::Failed
            }
        }
    }

    fn lock_permission(&self) -> std::sync::MutexGuard<'_, PermissionState> {
        self.permission
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve permission on first use, then reuse the answer.
    fn granted_backend(&self) -> Option<&dyn NotificationBackend> {
        let mut state = self.lock_permission();
        if state.permission == Permission::Default {
            state.backend = self.registry.detect();
            state.permission = if state.backend.is_some() {
                Permission::Granted
            } else {
                Permission::Denied
            };
            match state.backend.and_then(|i| self.registry.get(i)) {
                Some(backend) => info!(
                    event = "core.notify.permission_granted",
                    backend = backend.name(),
                ),
                None => warn!(
                    event = "core.notify.permission_denied",
                    reason = "no notification backend available",
                ),
            }
        }
        state.backend.and_then(|i| self.registry.get(i))
    }
}

/// Title and body for a delta's alert.
pub fn format_alert(delta: &Delta) -> (String, String) {
    let title = match delta.source {
        PollSource::SystemUpdates => "Beacon: system updates".to_string(),
        PollSource::Category(category) => format!("Beacon: {}", category),
    };

    let flagged: Vec<&str> = delta
        .sub_items
        .iter()
        .filter(|(_, sub)| sub.has_updates)
        .map(|(name, _)| name.as_str())
        .collect();
    let total = delta.total();

    let mut message = if total > 0 {
        format!("{} new in {}", total, delta.source)
    } else {
        format!("New activity in {}", delta.source)
    };
    if !flagged.is_empty() {
        message.push_str(&format!(" ({})", flagged.join(", ")));
    }
    (title, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{PreferenceField, Preferences, SettingsSink};
    use crate::state::SubItemDelta;
    use beacon_protocol::Category;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Probe {
        availability_checks: AtomicUsize,
        sent: Mutex<Vec<Alert>>,
    }

    struct FakeBackend {
        available: bool,
        fail: bool,
        probe: Arc<Probe>,
    }

    impl NotificationBackend for FakeBackend {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn is_available(&self) -> bool {
            self.probe.availability_checks.fetch_add(1, Ordering::SeqCst);
            self.available
        }

        fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::SendFailed {
                    message: "boom".to_string(),
                });
            }
            self.probe.sent.lock().unwrap().push(alert.clone());
            Ok(())
        }
    }

    fn fake_dispatcher(available: bool, fail: bool) -> (AlertDispatcher, Arc<Probe>) {
        let probe = Arc::new(Probe::default());
        let registry = NotificationRegistry::from_backends(vec![Box::new(FakeBackend {
            available,
            fail,
            probe: probe.clone(),
        })]);
        (AlertDispatcher::new(registry, true), probe)
    }

    fn new_returns(count: u64) -> Delta {
        Delta {
            count,
            has_updates: true,
            ..Delta::empty(Category::Returns.into())
        }
    }

    #[test]
    fn test_sends_and_asks_permission_once() {
        let (dispatcher, probe) = fake_dispatcher(true, false);
        assert_eq!(dispatcher.permission(), Permission::Default);
        assert_eq!(dispatcher.dispatch(&new_returns(2)), AlertOutcome::Sent);
        assert_eq!(dispatcher.dispatch(&new_returns(1)), AlertOutcome::Sent);
        assert_eq!(dispatcher.permission(), Permission::Granted);
        assert_eq!(probe.availability_checks.load(Ordering::SeqCst), 1);
        assert_eq!(probe.sent.lock().unwrap()[0].message, "2 new in returns");
    }

    #[test]
    fn test_denied_never_fails_and_never_asks_again() {
        let (dispatcher, probe) = fake_dispatcher(false, false);
        assert_eq!(
            dispatcher.dispatch(&new_returns(1)),
            AlertOutcome::PermissionDenied
        );
        assert_eq!(
            dispatcher.dispatch(&new_returns(1)),
            AlertOutcome::PermissionDenied
        );
        assert_eq!(dispatcher.permission(), Permission::Denied);
        assert_eq!(probe.availability_checks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_baseline_is_not_alerted() {
        let (dispatcher, probe) = fake_dispatcher(true, false);
        let mut delta = new_returns(5);
        delta.baseline = true;
        assert_eq!(dispatcher.dispatch(&delta), AlertOutcome::NotNew);
        // Permission isn't even requested for non-alerts.
        assert_eq!(probe.availability_checks.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_disabled_and_muted() {
        let (dispatcher, _) = fake_dispatcher(true, false);
        let disabled = AlertDispatcher {
            enabled: false,
            ..dispatcher
        };
        assert_eq!(disabled.dispatch(&new_returns(1)), AlertOutcome::Disabled);

        let settings = SharedSettings::default();
        let mut prefs = Preferences::default();
        prefs.set(PreferenceField::Category(Category::Returns), false);
        settings.write(&prefs).unwrap();
        let (dispatcher, probe) = fake_dispatcher(true, false);
        let dispatcher = dispatcher.with_settings(settings);
        assert_eq!(dispatcher.dispatch(&new_returns(1)), AlertOutcome::Muted);
        assert!(probe.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_sound_follows_preference() {
        let settings = SharedSettings::default();
        let mut prefs = Preferences::default();
        prefs.set(PreferenceField::AlertSound, true);
        settings.write(&prefs).unwrap();
        let (dispatcher, probe) = fake_dispatcher(true, false);
        let dispatcher = dispatcher.with_settings(settings);
        dispatcher.dispatch(&new_returns(1));
        assert!(probe.sent.lock().unwrap()[0].sound);
    }

    #[test]
    fn test_backend_failure_is_reported_not_raised() {
        let (dispatcher, _) = fake_dispatcher(true, true);
        assert_eq!(dispatcher.dispatch(&new_returns(1)), AlertOutcome::Failed);
    }

    #[test]
    fn test_format_names_flagged_sub_items() {
        let mut delta = Delta {
            has_updates: false,
            ..Delta::empty(Category::Reports.into())
        };
        delta.sub_items.insert(
            "Sales Report".to_string(),
            SubItemDelta {
                count: 0,
                has_updates: true,
            },
        );
        let (title, message) = format_alert(&delta);
        assert_eq!(title, "Beacon: reports");
        assert_eq!(message, "New activity in reports (Sales Report)");
    }
}
