//! # beacon-config
//!
//! TOML configuration types, loading, and validation for beacon.
//!
//! Single source of truth for `BeaconConfig` and its sections.
//! Depends only on `beacon-paths` and `beacon-protocol`.

mod defaults;
mod loading;
mod validation;

pub mod errors;
pub mod types;

// Public API re-exports
pub use errors::ConfigError;
pub use loading::{load_config_file, load_hierarchy, merge_configs};
pub use types::{
    AlertsConfig, BeaconConfig, EndpointConfig, PollingConfig, ReportsConfig, ReturnsConfig,
    RouteRule, SettingsConfig,
};
pub use validation::validate_config;

impl BeaconConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, ConfigError> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    ///
    /// See [`validation::validate_config`] for details.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_config(self)
    }
}
