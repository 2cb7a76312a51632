use clap::ArgMatches;
use tracing::{error, info};

use beacon_core::{BeaconError, PollSource};

use super::helpers::{build_engine, build_runtime, describe_outcome, load_config_with_warning};
use crate::color;

pub(crate) fn handle_refresh_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let source: PollSource = matches
        .get_one::<String>("source")
        .ok_or("Source argument is required")?
        .parse()?;

    info!(event = "cli.refresh_started", source = %source);

    let config = load_config_with_warning();
    let runtime = build_runtime()?;
    let result = runtime.block_on(async {
        let engine = build_engine(config)?;
        let result = engine.refresh(source).await;
        engine.shutdown();
        Ok::<_, Box<dyn std::error::Error>>(result)
    })?;

    match result {
        Ok(outcome) => {
            println!(
                "{} {}",
                color::tide(&format!("{}:", source)),
                describe_outcome(&outcome)
            );
            info!(event = "cli.refresh_completed", source = %source);
            Ok(())
        }
        Err(e) => {
            eprintln!(
                "{} {}",
                color::error(&format!("Refresh of '{}' failed:", source)),
                e
            );
            error!(
                event = "cli.refresh_failed",
                source = %source,
                code = e.error_code(),
                error = %e
            );
            Err(e.into())
        }
    }
}
