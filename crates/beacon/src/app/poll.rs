use beacon_protocol::PollSource;
use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, Command};

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .help("Output in JSON format")
        .action(ArgAction::SetTrue)
}

pub fn watch_command() -> Command {
    Command::new("watch")
        .about("Poll every source and print the badges whenever they change")
        .long_about("Starts one poller per source at its configured period, plus the date rollover check. Prints a badge summary on start and after every change. Stop with Ctrl+C.")
        .arg(json_arg())
}

pub fn refresh_command() -> Command {
    Command::new("refresh")
        .about("Run one fetch cycle for a single source")
        .arg(
            Arg::new("source")
                .help("Source to refresh")
                .required(true)
                .index(1)
                .value_parser(PossibleValuesParser::new(
                    PollSource::all().map(|source| source.as_str()),
                )),
        )
}

pub fn status_command() -> Command {
    Command::new("status")
        .about("Fetch every source once and show the notification panel")
        .arg(json_arg())
}
