//! User preferences and their debounced sync.
//!
//! Toggling a preference updates the desired state immediately; the write to
//! every [`SettingsSink`] happens once the toggles settle.

mod debouncer;
mod errors;
mod sink;
mod types;

pub use debouncer::SettingsDebouncer;
pub use errors::SettingsError;
pub use sink::{SettingsSink, SharedSettings, TomlSettingsFile};
pub use types::{PreferenceField, Preferences};
