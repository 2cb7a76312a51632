use std::sync::Arc;

use clap::ArgMatches;
use tracing::{error, info};

use beacon_core::{PreferenceField, Preferences, SettingsDebouncer, SettingsSink};

use super::helpers::{build_runtime, load_config_with_warning, settings_file};
use crate::color;
use crate::table::pad;

pub(crate) fn handle_settings_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = settings_file()?;
    let prefs = file.load().inspect_err(|e| {
        eprintln!("{} {}", color::error("Could not read settings:"), e);
        error!(event = "cli.settings.load_failed", error = %e);
    })?;

    let change = match matches.subcommand() {
        Some(("set", sub)) => {
            let field = *sub
                .get_one::<PreferenceField>("field")
                .ok_or("Field argument is required")?;
            let value = *sub
                .get_one::<bool>("value")
                .ok_or("Value argument is required")?;
            Some((field, Some(value)))
        }
        Some(("toggle", sub)) => {
            let field = *sub
                .get_one::<PreferenceField>("field")
                .ok_or("Field argument is required")?;
            Some((field, None))
        }
        _ => None,
    };

    let Some((field, value)) = change else {
        print_preferences(&prefs);
        return Ok(());
    };

    info!(event = "cli.settings_started", field = %field);
    let debounce = load_config_with_warning().settings.debounce();
    let file = Arc::new(file);
    let sinks: Vec<Arc<dyn SettingsSink>> = vec![file.clone()];

    // The debouncer schedules its timer on the runtime; flush writes right away.
    let runtime = build_runtime()?;
    let updated = runtime.block_on(async {
        let debouncer = SettingsDebouncer::new(prefs, debounce, sinks);
        match value {
            Some(value) => debouncer.set(field, value),
            None => {
                debouncer.toggle(field);
            }
        }
        debouncer.flush();
        debouncer.desired()
    });

    // The debouncer only logs write failures; re-read to confirm what landed.
    if file.load().ok().as_ref() != Some(&updated) {
        eprintln!(
            "{} {}",
            color::error("Could not save settings to"),
            file.path().display()
        );
        error!(event = "cli.settings_failed", field = %field);
        return Err("settings write failed".into());
    }

    println!(
        "{} {}",
        color::tide(&field.to_string()),
        on_off(updated.get(field))
    );
    info!(event = "cli.settings_completed", field = %field);
    Ok(())
}

fn on_off(value: bool) -> String {
    if value {
        color::kelp("on")
    } else {
        color::muted("off")
    }
}

fn print_preferences(prefs: &Preferences) {
    let names: Vec<String> = PreferenceField::all().map(|f| f.to_string()).collect();
    let width = names.iter().map(|n| n.len()).max().unwrap_or(0);
    for (field, name) in PreferenceField::all().zip(&names) {
        println!("{}  {}", color::tide(&pad(name, width)), on_off(prefs.get(field)));
    }
}
