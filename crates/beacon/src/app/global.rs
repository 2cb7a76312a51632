use clap::{Arg, ArgAction, Command};

pub fn root_command() -> Command {
    Command::new("beacon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Watch dashboard notification badges from the terminal")
        .long_about("Beacon polls the dashboard's action endpoint for returns, reports, warehouse, logs, users, suppliers and system updates, and shows what changed since you last looked. New activity raises a desktop alert.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colored output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
}
