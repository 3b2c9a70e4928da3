//! History command - load one window from the AIS history database.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use aistrack::period::HistoryPeriod;
use aistrack::ship::ShipRecord;
use aistrack::source::{write_snapshot, DatabaseAdapter, ShipSource};
use tracing::{info, warn};

use super::common::print_ships;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the history command.
pub struct HistoryArgs {
    /// Window end, `DD-MM-YYYY HH:MM[:SS]`. Falls back to `[database] time_start`.
    pub at: Option<String>,
    pub period: Option<String>,
    /// Write the loaded records as a snapshot file.
    pub export: Option<PathBuf>,
}

/// Run the history command.
pub fn run(runner: &CliRunner, args: HistoryArgs) -> Result<(), CliError> {
    runner.log_startup("history");
    let settings = runner.settings();

    let mut config = settings.database_config().ok_or_else(|| {
        CliError::Config(
            "no database configured. Set connection_string under [database] in config.ini"
                .to_string(),
        )
    })?;
    if let Some(period) = args.period {
        config.period = resolve_period(&period);
    }

    // An explicit --at replaces the configured start window
    if args.at.is_some() {
        config.time_start = None;
    } else if config.time_start.is_none() {
        return Err(CliError::Config(
            "no time given. Use --at or set time_start under [database]".to_string(),
        ));
    }

    let source = DatabaseAdapter::open(config, settings.render_config()?)?;
    if let Some(at) = &args.at {
        source.load_at_str(at)?;
    }

    if let Some(window) = source.window() {
        info!(
            start = %window.start_param(),
            end = %window.end_param(),
            ships = source.registry().len(),
            "History window loaded"
        );
        if !runner.json() {
            println!(
                "Window {} .. {} ({})",
                window.start_param(),
                window.end_param(),
                source.period()
            );
        }
    }

    print_ships(&source.get_ships(), runner.json())?;

    if let Some(path) = args.export {
        export_snapshot(&path, &source.registry().snapshot())?;
        info!(path = %path.display(), "Exported history snapshot");
        if !runner.json() {
            println!("Exported to {}", path.display());
        }
    }

    Ok(())
}

/// Period named on the command line; unknown names fall back to an hour.
fn resolve_period(name: &str) -> HistoryPeriod {
    HistoryPeriod::try_parse(name).unwrap_or_else(|| {
        warn!(period = name, "Unknown period, using hour");
        HistoryPeriod::Hour
    })
}

fn export_snapshot(path: &Path, records: &[ShipRecord]) -> Result<(), CliError> {
    let write_error = |error| CliError::FileWrite {
        path: path.display().to_string(),
        error,
    };
    let file = File::create(path).map_err(write_error)?;
    write_snapshot(records, BufWriter::new(file)).map_err(write_error)
}
