use tokio::runtime::Runtime;
use tracing::{error, warn};

use beacon_core::{BeaconConfig, Engine, PollOutcome, Preferences, TomlSettingsFile};
use beacon_paths::BeaconPaths;

use crate::color;

/// Load configuration with warning on errors.
///
/// Falls back to defaults if config loading fails, but notifies the user via:
/// - stderr message for immediate visibility
/// - structured log event `cli.config.load_failed` for debugging
pub fn load_config_with_warning() -> BeaconConfig {
    match BeaconConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "{} Could not load config: {}. Using defaults.\n\
                 {}",
                color::warning("Warning:"),
                e,
                color::hint(
                    "Tip: Check ~/.beacon/config.toml and ./.beacon/config.toml for syntax errors."
                ),
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                "Config load failed, using defaults"
            );
            BeaconConfig::default()
        }
    }
}

/// `~/.beacon/settings.toml`.
pub fn settings_file() -> Result<TomlSettingsFile, Box<dyn std::error::Error>> {
    let paths = BeaconPaths::resolve()?;
    Ok(TomlSettingsFile::new(paths.settings_file()))
}

/// Saved preferences, or defaults with a warning when they can't be read.
pub fn load_preferences_with_warning() -> Preferences {
    let loaded = settings_file().and_then(|file| file.load().map_err(Into::into));
    match loaded {
        Ok(prefs) => prefs,
        Err(e) => {
            eprintln!(
                "{} Could not load settings: {}. Using defaults.",
                color::warning("Warning:"),
                e
            );
            warn!(event = "cli.settings.load_failed", error = %e);
            Preferences::default()
        }
    }
}

pub fn build_runtime() -> Result<Runtime, Box<dyn std::error::Error>> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            error!(event = "cli.runtime.build_failed", error = %e);
            e.into()
        })
}

/// Wire the engine with the HTTP transport and the saved preferences.
pub fn build_engine(config: BeaconConfig) -> Result<Engine, Box<dyn std::error::Error>> {
    let prefs = load_preferences_with_warning();
    Engine::from_config(config, prefs).map_err(|e| {
        eprintln!("{} {}", color::error("Could not set up the endpoint client:"), e);
        error!(event = "cli.engine.init_failed", error = %e);
        e.into()
    })
}

/// One-line summary of a manual poll cycle.
pub fn describe_outcome(outcome: &PollOutcome) -> String {
    match outcome {
        PollOutcome::Applied(delta) if delta.baseline => match delta.total() {
            0 => "baseline, recent activity".to_string(),
            n => format!("baseline, {} pending", n),
        },
        PollOutcome::Applied(delta) => match delta.total() {
            0 => "new activity".to_string(),
            n => format!("{} new", n),
        },
        PollOutcome::Unchanged => "no changes".to_string(),
        PollOutcome::Skipped => "skipped, a fetch is already in flight".to_string(),
        PollOutcome::Discarded => "discarded, shutting down".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_core::{Category, Delta, PollSource};

    fn delta(count: u64, has_updates: bool, baseline: bool) -> Delta {
        let mut delta = Delta::empty(PollSource::Category(Category::Returns));
        delta.count = count;
        delta.has_updates = has_updates;
        delta.baseline = baseline;
        delta
    }

    #[test]
    fn test_describe_baseline() {
        let outcome = PollOutcome::Applied(delta(5, false, true));
        assert_eq!(describe_outcome(&outcome), "baseline, 5 pending");

        let outcome = PollOutcome::Applied(delta(0, true, true));
        assert_eq!(describe_outcome(&outcome), "baseline, recent activity");
    }

    #[test]
    fn test_describe_new_items() {
        let outcome = PollOutcome::Applied(delta(2, true, false));
        assert_eq!(describe_outcome(&outcome), "2 new");

        let outcome = PollOutcome::Applied(delta(0, true, false));
        assert_eq!(describe_outcome(&outcome), "new activity");
    }

    #[test]
    fn test_describe_non_applied() {
        assert_eq!(describe_outcome(&PollOutcome::Unchanged), "no changes");
        assert!(describe_outcome(&PollOutcome::Skipped).starts_with("skipped"));
    }
}
