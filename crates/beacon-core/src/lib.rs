//! beacon-core: notification aggregation and change detection for the dashboard
//!
//! Polls independent resource categories on their own schedules, decides what
//! is new since the last observation, and merges the result into one store
//! that every presentation surface reads from.
//!
//! # Main Entry Points
//!
//! - [`engine`] - Wire everything from a [`BeaconConfig`]
//! - [`state`] - The notification store and its reducer
//! - [`detect`] - Per-category change detection
//! - [`fetch`] - Snapshot fetchers against the remote action endpoint
//! - [`poll`] - Poll scheduler, overlap guard and day rollover
//! - [`view_clear`] - Clearing slices when the user looks at them
//! - [`settings`] - Debounced preference sync

pub mod detect;
pub mod engine;
pub mod errors;
pub mod fetch;
pub mod logging;
pub mod notify;
pub mod poll;
pub mod settings;
pub mod state;
pub mod surfaces;
pub mod view_clear;

pub use beacon_config::{BeaconConfig, ConfigError};
pub use beacon_protocol::{Category, PollSource};

pub use detect::{ChangeDetector, ChangePolicy, PollCursor, Snapshot, SnapshotKind, TimestampedItem};
pub use engine::Engine;
pub use errors::{BeaconError, BeaconResult};
pub use fetch::{
    ActionClient, FetchError, HttpActionClient, ParseError, PollError, SnapshotFetcher,
};
pub use notify::{AlertDispatcher, AlertOutcome, NotificationRegistry, Permission};
pub use poll::{
    DateRange, DateRangeTracker, PollOutcome, PollScheduler, PollState, PollerGuard, ViewScope,
};
pub use settings::{
    PreferenceField, Preferences, SettingsDebouncer, SettingsError, SettingsSink, SharedSettings,
    TomlSettingsFile,
};
pub use state::{
    CategoryState, Command, Counter, Delta, Event, NotificationState, NotificationStore,
    SubItemDelta, Subscription,
};
pub use surfaces::{Badge, HeaderIcon, NotificationPanel, SidebarBadges, badge_label};
pub use view_clear::ViewClearGateway;

// Re-export logging initialization
pub use logging::init_logging;
