//! Built-in fallback values used when no config file sets a field.

pub const ENDPOINT_URL: &str = "http://localhost:8080/api/actions";
pub const ENDPOINT_TIMEOUT_SECS: u64 = 10;

/// Report and returns list views refresh every 10 seconds.
pub const VIEW_POLL_SECS: u64 = 10;
/// The dedicated pending-returns watcher runs slower than the views.
pub const RETURNS_POLL_SECS: u64 = 30;
/// Midnight rollover only needs minute resolution.
pub const ROLLOVER_SECS: u64 = 60;

pub const RETURNS_LIMIT: u32 = 50;
pub const RETURNS_GROUP_BY_REASON: bool = false;

pub const REPORTS_WINDOW_HOURS: u32 = 24;
pub const REPORTS_RETRY_ATTEMPTS: u32 = 2;
pub const REPORTS_RETRY_DELAY_MS: u64 = 1000;

pub const SETTINGS_DEBOUNCE_MS: u64 = 100;

pub const ALERTS_ENABLED: bool = true;
