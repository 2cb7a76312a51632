use std::io::Write;

use clap::ArgMatches;
use serde::Serialize;
use tracing::info;

use beacon_core::{HeaderIcon, NotificationState, SidebarBadges};

use super::helpers::{build_engine, build_runtime, load_config_with_warning};
use crate::color;

#[derive(Serialize)]
struct WatchLine<'a> {
    header: HeaderIcon,
    #[serde(flatten)]
    badges: &'a SidebarBadges,
}

pub(crate) fn handle_watch_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    info!(event = "cli.watch_started", json_output = json_output);

    let config = load_config_with_warning();
    let runtime = build_runtime()?;
    runtime.block_on(async {
        let engine = build_engine(config)?;
        let scope = engine.mount_all("cli.watch");
        let mut subscription = engine.store().subscribe();

        if !json_output {
            eprintln!(
                "{}",
                color::hint(&format!(
                    "Watching {} sources. Press Ctrl+C to exit.",
                    scope.sources().count()
                ))
            );
        }
        print_summary(&subscription.current(), json_output)?;

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                next = subscription.changed() => match next {
                    Some(state) => print_summary(&state, json_output)?,
                    None => break,
                },
            }
        }

        drop(scope);
        engine.shutdown();
        info!(event = "cli.watch_completed");
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

fn print_summary(
    state: &NotificationState,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let header = HeaderIcon::from_state(state);
    let badges = SidebarBadges::from_state(state);

    let mut stdout = std::io::stdout().lock();
    if json_output {
        let line = WatchLine {
            header,
            badges: &badges,
        };
        writeln!(stdout, "{}", serde_json::to_string(&line)?)?;
    } else {
        writeln!(stdout, "{}", summary_line(&header, &badges, state))?;
    }
    stdout.flush()?;
    Ok(())
}

/// `returns 3 · logs • | system •`, or `all clear`.
fn summary_line(
    header: &HeaderIcon,
    badges: &SidebarBadges,
    state: &NotificationState,
) -> String {
    if !header.has_any {
        return color::kelp("all clear");
    }

    let mut parts: Vec<String> = badges
        .badges
        .iter()
        .filter(|b| !b.label().is_empty())
        .map(|b| format!("{} {}", color::tide(b.category.as_str()), color::beam(&b.label())))
        .collect();
    if parts.is_empty() {
        parts.push(color::muted("no category activity"));
    }

    let mut line = parts.join(&color::muted(" · "));
    let system = state.system();
    if !system.is_clear() {
        line.push_str(&color::muted(" | "));
        line.push_str(&format!(
            "{} {}",
            color::tide("system"),
            color::beam(&beacon_core::badge_label(system.count, system.has_updates))
        ));
    }
    line
}
