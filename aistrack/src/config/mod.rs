//! INI configuration.
//!
//! ```ini
//! [source]
//! module = database
//!
//! [database]
//! connection_string = ais.db
//! time_start = 15-06-2024 12:00
//!
//! [columns]
//! longitude = longtitude
//!
//! [chart]
//! utm_zone = 32
//! hemisphere = north
//! ```
//!
//! Every key is optional; absent keys keep their defaults.

mod file;
mod parser;
mod settings;

pub use file::{config_directory, config_file_path, ConfigFileError, CONFIG_DIR_NAME, CONFIG_FILE_NAME};
pub use settings::{
    ChartSettings, CoordinateSystem, DatabaseSettings, FileSettings, LiveSettings, Settings,
    SourceModule, SourceSettings, TimeSettings, DEFAULT_UTM_ZONE,
};
