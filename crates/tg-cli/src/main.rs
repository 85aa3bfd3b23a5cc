use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, Local, NaiveDate};
use clap::Parser;
use tg_core::{DayRange, Timeline};
use tracing_subscriber::EnvFilter;

use tg_cli::commands::{config, layout, replay};
use tg_cli::{Cli, Commands, Config, EventStore, RangeArgs};

/// Monday of the week containing `today`.
fn week_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
}

/// Load config and events, and lay them out over the requested range.
fn open_timeline(config_path: Option<&Path>, args: &RangeArgs) -> Result<(Timeline, EventStore)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let events_path = args.events.as_deref().unwrap_or(&config.events_path);
    let store = EventStore::load(events_path)?;

    let from = args
        .from
        .unwrap_or_else(|| week_start(Local::now().date_naive()));
    let range = DayRange::starting(from, args.days)
        .with_context(|| format!("invalid day range starting {from}"))?;
    let mut timeline = Timeline::new(config.timeline, range, config.viewport.size())
        .context("invalid timeline configuration")?;
    timeline.set_events(store.occurrences(&range));
    Ok((timeline, store))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match &cli.command {
        Some(Commands::Layout { range, json }) => {
            let (timeline, _store) = open_timeline(cli.config.as_deref(), range)?;
            layout::run(&timeline, *json)?;
        }
        Some(Commands::Replay {
            script,
            range,
            json,
        }) => {
            let (mut timeline, mut store) = open_timeline(cli.config.as_deref(), range)?;
            replay::run(&mut timeline, &mut store, script, *json)?;
        }
        Some(Commands::Config) => {
            let config =
                Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
            config::run(&config)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
