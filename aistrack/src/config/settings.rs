//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file. Conversion
//! into the typed component configs happens here; parsing lives in
//! [`super::parser`].

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDateTime;

use super::file::ConfigFileError;
use crate::coord::{BoundingBox, CoordinateTransformer, Hemisphere};
use crate::period::{HistoryPeriod, TtlWindow};
use crate::render::RenderConfig;
use crate::ship::ScaleConfig;
use crate::source::database::{ColumnMapping, DatabaseConfig, DEFAULT_TABLE};
use crate::source::live::{LiveConfig, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_REFRESH_INTERVAL_MS};
use crate::source::static_file::StaticFileConfig;

/// Default UTM zone of the chart.
pub const DEFAULT_UTM_ZONE: u8 = 33;

/// Which adapter feeds the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceModule {
    #[default]
    Live,
    Database,
    File,
}

impl SourceModule {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "live" => Some(SourceModule::Live),
            "database" | "db" => Some(SourceModule::Database),
            "file" | "static" => Some(SourceModule::File),
            _ => None,
        }
    }
}

impl fmt::Display for SourceModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceModule::Live => write!(f, "live"),
            SourceModule::Database => write!(f, "database"),
            SourceModule::File => write!(f, "file"),
        }
    }
}

/// Coordinate system the source reports positions in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateSystem {
    /// Longitude/latitude degrees, projected into the chart's UTM zone.
    #[default]
    Geographic,
    /// Already UTM easting/northing; passed through.
    Utm,
}

impl CoordinateSystem {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "geographic" | "wgs84" | "latlon" => Some(CoordinateSystem::Geographic),
            "utm" => Some(CoordinateSystem::Utm),
            _ => None,
        }
    }
}

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub source: SourceSettings,
    pub live: LiveSettings,
    pub database: DatabaseSettings,
    pub file: FileSettings,
    pub time: TimeSettings,
    pub chart: ChartSettings,
    pub scale: ScaleConfig,
}

/// `[source]`
#[derive(Debug, Clone, Default)]
pub struct SourceSettings {
    pub module: SourceModule,
}

/// `[live]`
#[derive(Debug, Clone)]
pub struct LiveSettings {
    pub host: String,
    pub port: u16,
    pub refresh_interval_ms: u64,
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
        }
    }
}

/// `[database]` and `[columns]`
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub connection_string: Option<String>,
    pub table: String,
    pub time_start: Option<NaiveDateTime>,
    pub columns: ColumnMapping,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            connection_string: None,
            table: DEFAULT_TABLE.to_string(),
            time_start: None,
            columns: ColumnMapping::default(),
        }
    }
}

/// `[file]`
#[derive(Debug, Clone, Default)]
pub struct FileSettings {
    pub path: Option<PathBuf>,
}

/// `[time]`: history window shown by the display.
#[derive(Debug, Clone, Copy)]
pub struct TimeSettings {
    pub period: HistoryPeriod,
    pub multiplier: u32,
}

impl Default for TimeSettings {
    fn default() -> Self {
        let window = TtlWindow::default();
        Self {
            period: window.period,
            multiplier: window.multiplier,
        }
    }
}

impl TimeSettings {
    pub fn ttl_window(&self) -> TtlWindow {
        TtlWindow::new(self.period, self.multiplier)
    }
}

/// `[chart]`
#[derive(Debug, Clone)]
pub struct ChartSettings {
    pub coordinate_system: CoordinateSystem,
    pub utm_zone: u8,
    pub hemisphere: Hemisphere,
    pub bounding_box: Option<BoundingBox>,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            coordinate_system: CoordinateSystem::default(),
            utm_zone: DEFAULT_UTM_ZONE,
            hemisphere: Hemisphere::default(),
            bounding_box: None,
        }
    }
}

impl Settings {
    /// Normalization settings for the query facade.
    pub fn render_config(&self) -> Result<RenderConfig, ConfigFileError> {
        let coordinates = match self.chart.coordinate_system {
            CoordinateSystem::Utm => CoordinateTransformer::passthrough(),
            CoordinateSystem::Geographic => {
                CoordinateTransformer::utm(self.chart.utm_zone, self.chart.hemisphere).map_err(
                    |e| ConfigFileError::InvalidValue {
                        section: "chart".to_string(),
                        key: "utm_zone".to_string(),
                        value: self.chart.utm_zone.to_string(),
                        reason: e.to_string(),
                    },
                )?
            }
        };

        let mut config = RenderConfig::new(coordinates).with_scale(self.scale);
        if let Some(bounds) = self.chart.bounding_box {
            config = config.with_bounds(bounds);
        }
        Ok(config)
    }

    pub fn live_config(&self) -> LiveConfig {
        LiveConfig::new(self.live.host.clone(), self.live.port)
            .with_refresh_interval(Duration::from_millis(self.live.refresh_interval_ms))
            .with_ttl_window(self.time.ttl_window())
    }

    /// Database adapter config, if a connection string is configured.
    pub fn database_config(&self) -> Option<DatabaseConfig> {
        let connection_string = self.database.connection_string.clone()?;
        Some(DatabaseConfig {
            connection_string,
            table: self.database.table.clone(),
            columns: self.database.columns.clone(),
            period: self.time.period,
            time_start: self.database.time_start,
        })
    }

    /// Static file config, if a path is configured.
    pub fn static_file_config(&self) -> Option<StaticFileConfig> {
        self.file.path.clone().map(StaticFileConfig::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.source.module, SourceModule::Live);
        assert_eq!(settings.chart.utm_zone, DEFAULT_UTM_ZONE);
        assert!(settings.database_config().is_none());
        assert!(settings.static_file_config().is_none());
        assert_eq!(settings.live_config(), LiveConfig::default());
    }

    #[test]
    fn test_utm_coordinate_system_passes_through() {
        let mut settings = Settings::default();
        settings.chart.coordinate_system = CoordinateSystem::Utm;
        let config = settings.render_config().unwrap();
        assert!(config.coordinates.is_passthrough());
    }

    #[test]
    fn test_invalid_zone_reported_as_config_error() {
        let mut settings = Settings::default();
        settings.chart.utm_zone = 0;
        let err = settings.render_config().unwrap_err();
        assert!(err.to_string().contains("chart.utm_zone"));
    }

    #[test]
    fn test_module_parse() {
        assert_eq!(SourceModule::parse("DB"), Some(SourceModule::Database));
        assert_eq!(SourceModule::parse("static"), Some(SourceModule::File));
        assert_eq!(SourceModule::parse("radio"), None);
        assert_eq!(CoordinateSystem::parse("UTM"), Some(CoordinateSystem::Utm));
    }
}
