//! CLI error handling with user-friendly messages.

use std::fmt;
use std::process;

use aistrack::config::ConfigFileError;
use aistrack::source::{DatabaseError, LiveError, SourceError, StaticFileError};

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// A ship source failed to open or load
    Source(SourceError),
    /// Failed to write output
    Output(std::io::Error),
    /// Failed to write an export file
    FileWrite { path: String, error: std::io::Error },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Source(SourceError::Live(LiveError::Connect { .. })) => {
                eprintln!();
                eprintln!("Check that the AIS feed is running and that [live] host/port");
                eprintln!("in config.ini (or --host/--port) point at it.");
            }
            CliError::Source(SourceError::Database(DatabaseError::MissingColumn { .. })) => {
                eprintln!();
                eprintln!("Map the table's column names under [columns] in config.ini, e.g.:");
                eprintln!("  longitude = longtitude");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Runtime(e) => write!(f, "Failed to start runtime: {}", e),
            CliError::Source(e) => write!(f, "{}", e),
            CliError::Output(e) => write!(f, "Failed to write output: {}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path, error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Runtime(e) => Some(e),
            CliError::Source(e) => Some(e),
            CliError::Output(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<LiveError> for CliError {
    fn from(e: LiveError) -> Self {
        CliError::Source(e.into())
    }
}

impl From<DatabaseError> for CliError {
    fn from(e: DatabaseError) -> Self {
        CliError::Source(e.into())
    }
}

impl From<StaticFileError> for CliError {
    fn from(e: StaticFileError) -> Self {
        CliError::Source(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message() {
        let err = CliError::Config("no database configured".to_string());
        assert_eq!(err.to_string(), "Configuration error: no database configured");
    }

    #[test]
    fn test_source_errors_convert() {
        let err: CliError = StaticFileError::MissingHeader.into();
        assert!(matches!(err, CliError::Source(SourceError::StaticFile(_))));
        assert_eq!(err.to_string(), "Ship file has no header row");
    }
}
