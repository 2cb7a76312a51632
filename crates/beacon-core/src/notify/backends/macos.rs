//! macOS notification backend using osascript.

use crate::notify::errors::NotifyError;
use crate::notify::traits::{Alert, NotificationBackend};

pub struct MacOsNotificationBackend;

/// Quote a string for an AppleScript literal.
fn applescript_quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

fn build_script(alert: &Alert) -> String {
    let mut script = format!(
        "display notification {} with title {}",
        applescript_quote(&alert.message),
        applescript_quote(&alert.title)
    );
    if alert.sound {
        script.push_str(" sound name \"default\"");
    }
    script
}

impl NotificationBackend for MacOsNotificationBackend {
    fn name(&self) -> &'static str {
        "macos"
    }

    fn is_available(&self) -> bool {
        cfg!(target_os = "macos") && which::which("osascript").is_ok()
    }

    fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        let output = std::process::Command::new("osascript")
            .arg("-e")
            .arg(build_script(alert))
            .output()
            .map_err(|e| NotifyError::SendFailed {
                message: format!("osascript exec failed: {}", e),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(NotifyError::SendFailed {
                message: format!("osascript exit {}: {}", output.status, stderr.trim()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_escapes_quotes() {
        let alert = Alert {
            title: "Beacon".to_string(),
            message: "3 new in \"reports\"".to_string(),
            sound: true,
        };
        assert_eq!(
            build_script(&alert),
            r#"display notification "3 new in \"reports\"" with title "Beacon" sound name "default""#
        );
    }

    #[test]
    fn macos_backend_unavailable_elsewhere() {
        if !cfg!(target_os = "macos") {
            assert!(!MacOsNotificationBackend.is_available());
        }
    }
}
