//! Linux notification backend using notify-send (libnotify).

use crate::notify::errors::NotifyError;
use crate::notify::traits::{Alert, NotificationBackend};

pub struct LinuxNotificationBackend;

impl NotificationBackend for LinuxNotificationBackend {
    fn name(&self) -> &'static str {
        "linux"
    }

    fn is_available(&self) -> bool {
        cfg!(target_os = "linux") && which::which("notify-send").is_ok()
    }

    fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        let mut command = std::process::Command::new("notify-send");
        command.arg("--app-name=beacon");
        if alert.sound {
            command.arg("--hint=string:sound-name:message-new-instant");
        }
        let output = command
            .arg(&alert.title)
            .arg(&alert.message)
            .output()
            .map_err(|e| NotifyError::SendFailed {
                message: format!("notify-send exec failed: {}", e),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(NotifyError::SendFailed {
                message: format!("notify-send exit {}: {}", output.status, stderr.trim()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linux_backend_availability_matches_platform() {
        let backend = LinuxNotificationBackend;
        assert_eq!(backend.name(), "linux");
        if !cfg!(target_os = "linux") {
            assert!(!backend.is_available());
        }
    }
}
