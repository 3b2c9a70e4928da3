//! aistrack CLI - print vessel positions from a live feed, a history
//! database or a snapshot file.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use aistrack::config::SourceModule;
use clap::{Parser, Subcommand};

use commands::history::HistoryArgs;
use commands::live::LiveArgs;
use error::CliError;
use runner::CliRunner;

/// Default interval between prints in live mode.
const DEFAULT_TICK_MS: u64 = 1000;

#[derive(Parser)]
#[command(name = "aistrack")]
#[command(version, about = "AIS vessel positions for chart displays", long_about = None)]
struct Cli {
    /// Config file (default: ~/.aistrack/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print ships as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    /// Source to read; defaults to [source] module from the config file
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Follow a live NMEA feed
    Live {
        /// Feed host (overrides [live] host)
        #[arg(long)]
        host: Option<String>,

        /// Feed port (overrides [live] port)
        #[arg(long)]
        port: Option<u16>,

        /// Stop after this many prints
        #[arg(long)]
        ticks: Option<u64>,

        /// Milliseconds between prints
        #[arg(long, default_value_t = DEFAULT_TICK_MS)]
        tick_ms: u64,
    },

    /// Show one window of the history database
    History {
        /// Window end, DD-MM-YYYY HH:MM[:SS]
        #[arg(long)]
        at: Option<String>,

        /// Window length: hour, day, week, month or year
        #[arg(long)]
        period: Option<String>,

        /// Also write the loaded ships to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Show a static snapshot file
    File {
        /// CSV file (default: [file] path)
        path: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let runner = CliRunner::new(cli.config.as_deref(), cli.json)?;

    let command = cli.command.unwrap_or_else(|| match runner.settings().source.module {
        SourceModule::Live => Commands::Live {
            host: None,
            port: None,
            ticks: None,
            tick_ms: DEFAULT_TICK_MS,
        },
        SourceModule::Database => Commands::History {
            at: None,
            period: None,
            export: None,
        },
        SourceModule::File => Commands::File { path: None },
    });

    match command {
        Commands::Live {
            host,
            port,
            ticks,
            tick_ms,
        } => commands::live::run(
            &runner,
            LiveArgs {
                host,
                port,
                ticks,
                tick_ms,
            },
        ),
        Commands::History { at, period, export } => {
            commands::history::run(&runner, HistoryArgs { at, period, export })
        }
        Commands::File { path } => commands::file::run(&runner, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_live_with_overrides() {
        let cli = Cli::try_parse_from([
            "aistrack", "--json", "live", "--host", "10.0.0.5", "--port", "2000", "--ticks", "3",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Some(Commands::Live {
                host,
                port,
                ticks,
                tick_ms,
            }) => {
                assert_eq!(host.as_deref(), Some("10.0.0.5"));
                assert_eq!(port, Some(2000));
                assert_eq!(ticks, Some(3));
                assert_eq!(tick_ms, DEFAULT_TICK_MS);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_history() {
        let cli = Cli::try_parse_from([
            "aistrack",
            "history",
            "--at",
            "15-06-2024 12:00",
            "--period",
            "day",
            "--config",
            "/tmp/ais.ini",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/ais.ini")));
        assert!(matches!(
            cli.command,
            Some(Commands::History { at: Some(ref at), period: Some(ref p), export: None })
                if at == "15-06-2024 12:00" && p == "day"
        ));
    }

    #[test]
    fn test_subcommand_is_optional() {
        let cli = Cli::try_parse_from(["aistrack"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(Cli::try_parse_from(["aistrack", "live", "--port", "70000"]).is_err());
    }
}
