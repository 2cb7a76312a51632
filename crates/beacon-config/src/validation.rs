//! Configuration validation logic.

use std::collections::HashSet;

use beacon_protocol::{Category, PollSource};

use crate::errors::ConfigError;
use crate::types::BeaconConfig;

fn invalid(message: String) -> ConfigError {
    ConfigError::InvalidConfiguration { message }
}

/// Validate a BeaconConfig, returning an error if any values are invalid.
///
/// # Validation Rules
///
/// - Endpoint URL must be http(s) and the timeout non-zero
/// - Every polling period, including rollover, must be non-zero
/// - `returns.limit` in 1..=500, `reports.window_hours` in 1..=720,
///   `reports.retry_attempts` in 1..=5
/// - Route paths must start with `/` and be unique
/// - A route clearing a returns sub-item needs `returns.group_by_reason`
pub fn validate_config(config: &BeaconConfig) -> Result<(), ConfigError> {
    let url = config.endpoint.url();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(invalid(format!(
            "endpoint.url must start with http:// or https://, got '{}'",
            url
        )));
    }
    if config.endpoint.timeout().is_zero() {
        return Err(invalid("endpoint.timeout_secs must be > 0".to_string()));
    }

    for source in PollSource::all() {
        if config.polling.period_secs(source) == 0 {
            return Err(invalid(format!("polling period for '{}' must be > 0", source)));
        }
    }
    if config.polling.rollover_period().is_zero() {
        return Err(invalid("polling.rollover_secs must be > 0".to_string()));
    }

    let limit = config.returns.limit();
    if !(1..=500).contains(&limit) {
        return Err(invalid(format!(
            "returns.limit must be between 1 and 500, got {}",
            limit
        )));
    }

    let hours = config.reports.window_hours();
    if !(1..=720).contains(&hours) {
        return Err(invalid(format!(
            "reports.window_hours must be between 1 and 720, got {}",
            hours
        )));
    }

    let attempts = config.reports.retry_attempts();
    if !(1..=5).contains(&attempts) {
        return Err(invalid(format!(
            "reports.retry_attempts must be between 1 and 5, got {}",
            attempts
        )));
    }

    let mut seen = HashSet::new();
    for route in &config.routes {
        if !route.path.starts_with('/') {
            return Err(invalid(format!(
                "route path '{}' must start with '/'",
                route.path
            )));
        }
        if !seen.insert(route.path.as_str()) {
            return Err(invalid(format!("duplicate route path '{}'", route.path)));
        }
        if route.category == Category::Returns
            && route.sub_item.is_some()
            && !config.returns.group_by_reason()
        {
            return Err(invalid(format!(
                "route '{}' clears a returns sub-item, which needs returns.group_by_reason = true",
                route.path
            )));
        }
    }

    Ok(())
}
