mod global;
mod misc;
mod poll;


use clap::Command;

pub fn build_cli() -> Command {
    global::root_command()
        .subcommand(poll::watch_command())
        .subcommand(poll::refresh_command())
        .subcommand(poll::status_command())
        .subcommand(misc::config_command())
        .subcommand(misc::settings_command())
        .subcommand(misc::completions_command())
}
