//! Common setup for every command: config loading and logging.

use std::path::Path;

use aistrack::config::{config_directory, Settings};
use aistrack::logging::{init_logging_full, LoggingGuard, DEFAULT_LOG_FILE};
use tracing::info;

use crate::error::CliError;

/// Runner that owns the loaded settings and keeps logging alive.
pub struct CliRunner {
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    settings: Settings,
    json: bool,
}

impl CliRunner {
    /// Load config (default path unless `config_path` is given) and start logging.
    ///
    /// Stdout logging is disabled when printing JSON.
    pub fn new(config_path: Option<&Path>, json: bool) -> Result<Self, CliError> {
        let settings = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "config file '{}' does not exist",
                        path.display()
                    )));
                }
                Settings::load_from(path)?
            }
            None => Settings::load()?,
        };

        let log_dir = config_directory().join("logs");
        let logging_guard = init_logging_full(&log_dir, DEFAULT_LOG_FILE, !json)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            settings,
            json,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn json(&self) -> bool {
        self.json
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!(version = env!("CARGO_PKG_VERSION"), command, "aistrack starting");
    }
}
