use beacon_core::PreferenceField;
use clap::builder::BoolishValueParser;
use clap::{Arg, Command};
use clap_complete::Shell;

pub fn config_command() -> Command {
    Command::new("config").about("Print the effective configuration as TOML")
}

fn field_arg() -> Arg {
    let names: Vec<String> = PreferenceField::all().map(|f| f.to_string()).collect();
    Arg::new("field")
        .help(format!("Preference to change ({})", names.join(", ")))
        .required(true)
        .index(1)
        .value_parser(|s: &str| s.parse::<PreferenceField>())
}

pub fn settings_command() -> Command {
    Command::new("settings")
        .about("Show or change notification preferences")
        .subcommand(
            Command::new("set")
                .about("Set a preference on or off")
                .arg(field_arg())
                .arg(
                    Arg::new("value")
                        .help("on/off, true/false, yes/no")
                        .required(true)
                        .index(2)
                        .value_parser(BoolishValueParser::new()),
                ),
        )
        .subcommand(
            Command::new("toggle")
                .about("Flip a preference")
                .arg(field_arg()),
        )
}

pub fn completions_command() -> Command {
    Command::new("completions")
        .about("Generate shell completion scripts")
        .arg(
            Arg::new("shell")
                .help("Target shell")
                .required(true)
                .index(1)
                .value_parser(clap::value_parser!(Shell)),
        )
}
