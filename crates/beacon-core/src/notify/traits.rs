use super::errors::NotifyError;

/// One OS-level alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub sound: bool,
}

/// A way to put an alert on the user's desktop.
pub trait NotificationBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the backend can deliver on this machine. Checked once per
    /// session, when permission is first requested.
    fn is_available(&self) -> bool;

    fn send(&self, alert: &Alert) -> Result<(), NotifyError>;
}
