//! Ordered set of notification backends.

use tracing::debug;

use super::backends::{LinuxNotificationBackend, MacOsNotificationBackend};
use super::traits::NotificationBackend;

pub struct NotificationRegistry {
    backends: Vec<Box<dyn NotificationBackend>>,
}

impl NotificationRegistry {
    /// The backends for the supported desktop platforms.
    pub fn platform() -> Self {
        Self::from_backends(vec![
            Box::new(MacOsNotificationBackend),
            Box::new(LinuxNotificationBackend),
        ])
    }

    pub fn from_backends(backends: Vec<Box<dyn NotificationBackend>>) -> Self {
        Self { backends }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Index of the first available backend. Registration order is priority.
    pub(crate) fn detect(&self) -> Option<usize> {
        let found = self.backends.iter().position(|b| b.is_available());
        if found.is_none() {
            debug!(
                event = "core.notify.detect_completed",
                reason = "no backend available",
            );
        }
        found
    }

    pub(crate) fn get(&self, index: usize) -> Option<&dyn NotificationBackend> {
        self.backends.get(index).map(|b| b.as_ref())
    }
}
