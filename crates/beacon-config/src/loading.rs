//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.beacon/config.toml` (global user preferences)
//! 3. **Project config** - `./.beacon/config.toml` (deployment-specific overrides)

use std::fs;
use std::path::Path;

use beacon_paths::BeaconPaths;
use tracing::{debug, warn};

use crate::errors::ConfigError;
use crate::types::{
    AlertsConfig, BeaconConfig, EndpointConfig, PollingConfig, ReportsConfig, ReturnsConfig,
    SettingsConfig,
};
use crate::validation::validate_config;

/// Load configuration from the hierarchy of config files.
///
/// # Errors
///
/// Returns an error if a present file fails to parse or the merged result
/// fails validation. Missing config files are not errors.
pub fn load_hierarchy() -> Result<BeaconConfig, ConfigError> {
    let mut config = BeaconConfig::default();

    match BeaconPaths::resolve() {
        Ok(paths) => {
            if let Some(user_config) = load_optional(&paths.user_config())? {
                config = merge_configs(config, user_config);
            }
        }
        Err(e) => {
            warn!(
                event = "config.loading.user_config_skipped",
                error = %e,
            );
        }
    }

    let project_root = std::env::current_dir()?;
    if let Some(project_config) = load_optional(&BeaconPaths::project_config(&project_root))? {
        config = merge_configs(config, project_config);
    }

    validate_config(&config)?;

    Ok(config)
}

fn load_optional(path: &Path) -> Result<Option<BeaconConfig>, ConfigError> {
    match load_config_file(path) {
        Ok(config) => Ok(Some(config)),
        Err(ConfigError::IoError { source }) if source.kind() == std::io::ErrorKind::NotFound => {
            debug!(
                event = "config.loading.file_missing",
                path = %path.display(),
            );
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Load a single configuration file without merging or validating it.
pub fn load_config_file(path: &Path) -> Result<BeaconConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        message: format!("'{}': {}", path.display(), e),
    })
}

/// Merge two configurations, with `override_config` taking precedence.
///
/// Scalar fields are replaced only when the override sets them. Routes merge
/// by path: an override route replaces the base route with the same path,
/// new paths are appended.
pub fn merge_configs(base: BeaconConfig, override_config: BeaconConfig) -> BeaconConfig {
    BeaconConfig {
        endpoint: EndpointConfig {
            url: override_config.endpoint.url.or(base.endpoint.url),
            timeout_secs: override_config
                .endpoint
                .timeout_secs
                .or(base.endpoint.timeout_secs),
        },
        polling: PollingConfig::merge(&base.polling, &override_config.polling),
        returns: ReturnsConfig {
            limit: override_config.returns.limit.or(base.returns.limit),
            group_by_reason: override_config
                .returns
                .group_by_reason
                .or(base.returns.group_by_reason),
        },
        reports: ReportsConfig {
            window_hours: override_config
                .reports
                .window_hours
                .or(base.reports.window_hours),
            retry_attempts: override_config
                .reports
                .retry_attempts
                .or(base.reports.retry_attempts),
            retry_delay_ms: override_config
                .reports
                .retry_delay_ms
                .or(base.reports.retry_delay_ms),
        },
        settings: SettingsConfig {
            debounce_ms: override_config
                .settings
                .debounce_ms
                .or(base.settings.debounce_ms),
        },
        alerts: AlertsConfig {
            enabled: override_config.alerts.enabled.or(base.alerts.enabled),
        },
        routes: {
            let mut merged = base.routes;
            for route in override_config.routes {
                match merged.iter_mut().find(|r| r.path == route.path) {
                    Some(existing) => *existing = route,
                    None => merged.push(route),
                }
            }
            merged
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RouteRule;
    use beacon_protocol::{Category, PollSource};
    use std::time::Duration;

    #[test]
    fn test_load_config_file_missing_is_io_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::IoError { ref source } if source.kind() == std::io::ErrorKind::NotFound
        ));
    }

    #[test]
    fn test_load_config_file_parse_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[polling\nreturns_secs = 5").unwrap();
        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_merge_override_wins_for_set_fields_only() {
        let base: BeaconConfig = toml::from_str(
            r#"
[endpoint]
url = "https://shop.example/api"
timeout_secs = 5

[polling]
returns_secs = 45
"#,
        )
        .unwrap();
        let over: BeaconConfig = toml::from_str(
            r#"
[endpoint]
timeout_secs = 20

[polling]
logs_secs = 15
"#,
        )
        .unwrap();

        let merged = merge_configs(base, over);
        assert_eq!(merged.endpoint.url(), "https://shop.example/api");
        assert_eq!(merged.endpoint.timeout(), Duration::from_secs(20));
        assert_eq!(
            merged.polling.period(PollSource::Category(Category::Returns)),
            Duration::from_secs(45)
        );
        assert_eq!(
            merged.polling.period(PollSource::Category(Category::Logs)),
            Duration::from_secs(15)
        );
    }

    #[test]
    fn test_merge_routes_by_path() {
        let route = |path: &str, category, sub: Option<&str>| RouteRule {
            path: path.to_string(),
            category,
            sub_item: sub.map(str::to_string),
        };
        let base = BeaconConfig {
            routes: vec![
                route("/returns", Category::Returns, None),
                route("/reports", Category::Reports, None),
            ],
            ..Default::default()
        };
        let over = BeaconConfig {
            routes: vec![
                route("/reports", Category::Reports, Some("Sales Report")),
                route("/logs", Category::Logs, None),
            ],
            ..Default::default()
        };

        let merged = merge_configs(base, over);
        assert_eq!(merged.routes.len(), 3);
        assert_eq!(merged.routes[1].sub_item.as_deref(), Some("Sales Report"));
        assert_eq!(merged.routes[2].path, "/logs");
    }

    #[test]
    fn test_load_hierarchy_reads_user_and_project() {
        let home = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        fs::create_dir_all(home.path().join(".beacon")).unwrap();
        fs::write(
            home.path().join(".beacon/config.toml"),
            "[returns]\nlimit = 25\ngroup_by_reason = true\n[alerts]\nenabled = false\n",
        )
        .unwrap();
        fs::create_dir_all(project.path().join(".beacon")).unwrap();
        fs::write(
            project.path().join(".beacon/config.toml"),
            "[returns]\nlimit = 75\n",
        )
        .unwrap();

        let original_dir = std::env::current_dir().unwrap();
        let config = temp_env::with_var("HOME", Some(home.path()), || {
            std::env::set_current_dir(project.path()).unwrap();
            let result = load_hierarchy();
            std::env::set_current_dir(&original_dir).unwrap();
            result
        })
        .unwrap();

        assert_eq!(config.returns.limit(), 75);
        // Unset in the project file, so the user's choice survives the merge.
        assert!(config.returns.group_by_reason());
        assert!(!config.alerts.enabled());
    }
}
