use clap::ArgMatches;
use tracing::{info, warn};

use beacon_core::NotificationPanel;

use super::helpers::{build_engine, build_runtime, load_config_with_warning};
use crate::color;
use crate::table::PanelTable;

pub(crate) fn handle_status_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    info!(event = "cli.status_started", json_output = json_output);

    let config = load_config_with_warning();
    let runtime = build_runtime()?;
    let (results, state) = runtime.block_on(async {
        let engine = build_engine(config)?;
        let results = engine.refresh_all().await;
        let state = engine.store().snapshot();
        engine.shutdown();
        Ok::<_, Box<dyn std::error::Error>>((results, state))
    })?;

    let mut failed = 0;
    for (source, result) in &results {
        if let Err(e) = result {
            failed += 1;
            eprintln!(
                "{} {}",
                color::warning(&format!("Could not fetch '{}':", source)),
                e
            );
            warn!(event = "cli.status_source_failed", source = %source, error = %e);
        }
    }

    let panel = NotificationPanel::from_state(&state);
    if json_output {
        println!("{}", serde_json::to_string_pretty(&panel)?);
    } else {
        print!("{}", PanelTable::new(&panel).render());
    }

    if !results.is_empty() && failed == results.len() {
        warn!(event = "cli.status_failed", reason = "every source failed");
        return Err("every source failed".into());
    }

    info!(
        event = "cli.status_completed",
        sources = results.len(),
        failed = failed
    );
    Ok(())
}
