use clap::ArgMatches;
use tracing::{error, info};

mod completions;
mod config;
mod helpers;
mod refresh;
mod settings;
mod status;
mod watch;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    info!(event = "cli.app_started", version = env!("CARGO_PKG_VERSION"));

    match matches.subcommand() {
        Some(("watch", sub_matches)) => watch::handle_watch_command(sub_matches),
        Some(("refresh", sub_matches)) => refresh::handle_refresh_command(sub_matches),
        Some(("status", sub_matches)) => status::handle_status_command(sub_matches),
        Some(("config", sub_matches)) => config::handle_config_command(sub_matches),
        Some(("settings", sub_matches)) => settings::handle_settings_command(sub_matches),
        Some(("completions", sub_matches)) => {
            completions::handle_completions_command(sub_matches)
        }
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}
