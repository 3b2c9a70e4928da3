//! File command - show a static snapshot file.

use std::path::PathBuf;

use aistrack::source::{ShipSource, StaticFileAdapter, StaticFileConfig};

use super::common::print_ships;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the file command. The path falls back to `[file] path`.
pub fn run(runner: &CliRunner, path: Option<PathBuf>) -> Result<(), CliError> {
    runner.log_startup("file");
    let settings = runner.settings();

    let config = match path {
        Some(path) => StaticFileConfig::new(path),
        None => settings.static_file_config().ok_or_else(|| {
            CliError::Config("no file given. Pass a path or set path under [file]".to_string())
        })?,
    };

    let source = StaticFileAdapter::open(&config, settings.render_config()?)?;
    print_ships(&source.get_ships(), runner.json())
}
