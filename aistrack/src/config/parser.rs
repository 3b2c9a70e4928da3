//! INI parsing logic for converting `Ini` → `Settings`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::Ini;
use tracing::warn;

use super::file::ConfigFileError;
use super::settings::{CoordinateSystem, Settings, SourceModule};
use crate::coord::{BoundingBox, Hemisphere};
use crate::period::HistoryPeriod;
use crate::source::database::parse_timestamp;

/// Parse an `Ini` object into `Settings`.
///
/// Starts from `Settings::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<Settings, ConfigFileError> {
    let mut settings = Settings::default();

    // [source] section
    if let Some(section) = ini.section(Some("source")) {
        if let Some(v) = section.get("module") {
            settings.source.module = SourceModule::parse(v)
                .ok_or_else(|| invalid("source", "module", v, "must be one of: live, database, file"))?;
        }
    }

    // [live] section
    if let Some(section) = ini.section(Some("live")) {
        if let Some(v) = section.get("host") {
            let v = v.trim();
            if !v.is_empty() {
                settings.live.host = v.to_string();
            }
        }
        if let Some(v) = section.get("port") {
            settings.live.port = parse_number("live", "port", v)?;
        }
        if let Some(v) = section.get("refresh_interval_ms") {
            let ms: u64 = parse_number("live", "refresh_interval_ms", v)?;
            if ms == 0 {
                return Err(invalid("live", "refresh_interval_ms", v, "must be greater than 0"));
            }
            settings.live.refresh_interval_ms = ms;
        }
    }

    // [database] section
    if let Some(section) = ini.section(Some("database")) {
        if let Some(v) = section.get("connection_string") {
            let v = v.trim();
            if !v.is_empty() {
                settings.database.connection_string =
                    Some(expand_tilde(v).to_string_lossy().into_owned());
            }
        }
        if let Some(v) = section.get("table") {
            let v = v.trim();
            if !v.is_empty() {
                settings.database.table = v.to_string();
            }
        }
        if let Some(v) = section.get("time_start") {
            let v = v.trim();
            if !v.is_empty() {
                let start = parse_timestamp(v).map_err(|e| {
                    invalid("database", "time_start", v, &e.to_string())
                })?;
                settings.database.time_start = Some(start);
            }
        }
    }

    // [columns] section: canonical field = actual column
    if let Some(section) = ini.section(Some("columns")) {
        for (field, column) in section.iter() {
            let column = column.trim();
            if column.is_empty() {
                return Err(invalid("columns", field, column, "column name is empty"));
            }
            if !settings.database.columns.set(field, column) {
                return Err(invalid(
                    "columns",
                    field,
                    column,
                    "unknown field (expected mmsi, latitude, longitude, heading, color or timestamp)",
                ));
            }
        }
    }

    // [file] section
    if let Some(section) = ini.section(Some("file")) {
        if let Some(v) = section.get("path") {
            let v = v.trim();
            if !v.is_empty() {
                settings.file.path = Some(expand_tilde(v));
            }
        }
    }

    // [time] section
    if let Some(section) = ini.section(Some("time")) {
        if let Some(v) = section.get("period") {
            settings.time.period = HistoryPeriod::try_parse(v).unwrap_or_else(|| {
                warn!(period = v, "Unknown [time] period, using hour");
                HistoryPeriod::Hour
            });
        }
        if let Some(v) = section.get("multiplier") {
            let multiplier: u32 = parse_number("time", "multiplier", v)?;
            if multiplier == 0 {
                return Err(invalid("time", "multiplier", v, "must be at least 1"));
            }
            settings.time.multiplier = multiplier;
        }
    }

    // [chart] section
    if let Some(section) = ini.section(Some("chart")) {
        if let Some(v) = section.get("coordinate_system") {
            settings.chart.coordinate_system = CoordinateSystem::parse(v)
                .ok_or_else(|| invalid("chart", "coordinate_system", v, "must be one of: geographic, utm"))?;
        }
        if let Some(v) = section.get("utm_zone") {
            let zone: u8 = parse_number("chart", "utm_zone", v)?;
            if !(1..=60).contains(&zone) {
                return Err(invalid("chart", "utm_zone", v, "must be between 1 and 60"));
            }
            settings.chart.utm_zone = zone;
        }
        if let Some(v) = section.get("hemisphere") {
            settings.chart.hemisphere = Hemisphere::parse(v)
                .ok_or_else(|| invalid("chart", "hemisphere", v, "must be north or south"))?;
        }
        if let Some(v) = section.get("bounding_box") {
            if !v.trim().is_empty() {
                settings.chart.bounding_box = Some(parse_bounding_box(v)?);
            }
        }
    }

    // [scale] section
    if let Some(section) = ini.section(Some("scale")) {
        if let Some(v) = section.get("dynamic") {
            settings.scale.dynamic = parse_bool(v);
        }
        if let Some(v) = section.get("user_scale") {
            let scale: f64 = parse_number("scale", "user_scale", v)?;
            if !(scale.is_finite() && scale > 0.0) {
                return Err(invalid("scale", "user_scale", v, "must be a positive number"));
            }
            settings.scale.user_scale = scale;
        }
    }

    Ok(settings)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_number<T: FromStr>(section: &str, key: &str, value: &str) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, "not a valid number"))
}

/// Parse `min_x,min_y,max_x,max_y`.
fn parse_bounding_box(value: &str) -> Result<BoundingBox, ConfigFileError> {
    let parts: Vec<f64> = value
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| invalid("chart", "bounding_box", value, "expected four numbers"))?;

    match parts.as_slice() {
        &[min_x, min_y, max_x, max_y] if parts.iter().all(|p| p.is_finite()) => {
            Ok(BoundingBox::new(min_x, min_y, max_x, max_y))
        }
        _ => Err(invalid(
            "chart",
            "bounding_box",
            value,
            "expected min_x,min_y,max_x,max_y",
        )),
    }
}

pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::time::Duration;
    use tempfile::TempDir;

    fn load(content: &str) -> Result<Settings, ConfigFileError> {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, content).unwrap();
        Settings::load_from(&path)
    }

    #[test]
    fn test_full_config() {
        let settings = load(
            r#"
[source]
module = database

[live]
host = 10.0.0.5
port = 2000
refresh_interval_ms = 250

[database]
connection_string = /var/lib/ais/history.db
table = Positions
time_start = 15-06-2024 12:00

[columns]
longitude = longtitude
ship_type = shiptype

[file]
path = /tmp/ships.csv

[time]
period = week
multiplier = 2

[chart]
coordinate_system = geographic
utm_zone = 32
hemisphere = south
bounding_box = 500000, 6600000, 400000, 6700000

[scale]
dynamic = yes
user_scale = 2.5
"#,
        )
        .unwrap();

        assert_eq!(settings.source.module, SourceModule::Database);
        assert_eq!(settings.live.host, "10.0.0.5");
        assert_eq!(settings.live.port, 2000);
        assert_eq!(settings.live.refresh_interval_ms, 250);

        let db = settings.database_config().unwrap();
        assert_eq!(db.connection_string, "/var/lib/ais/history.db");
        assert_eq!(db.table, "Positions");
        assert_eq!(db.columns.longitude, "longtitude");
        assert_eq!(db.columns.color, "shiptype");
        assert_eq!(db.columns.mmsi, "mmsi");
        assert_eq!(db.period, HistoryPeriod::Week);
        assert_eq!(
            db.time_start,
            NaiveDate::from_ymd_opt(2024, 6, 15).and_then(|d| d.and_hms_opt(12, 0, 0))
        );

        assert_eq!(
            settings.static_file_config().unwrap().path,
            PathBuf::from("/tmp/ships.csv")
        );

        let live = settings.live_config();
        assert_eq!(live.refresh_interval, Duration::from_millis(250));
        assert_eq!(live.ttl, Duration::from_secs(2 * 7 * 86_400));

        assert_eq!(settings.chart.utm_zone, 32);
        assert_eq!(settings.chart.hemisphere, Hemisphere::South);
        let bounds = settings.chart.bounding_box.unwrap();
        assert_eq!((bounds.min_x, bounds.max_x), (400000.0, 500000.0));

        assert!(settings.scale.dynamic);
        assert_eq!(settings.scale.user_scale, 2.5);

        let render = settings.render_config().unwrap();
        assert!(!render.coordinates.is_passthrough());
        assert!(render.bounds.is_some());
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let settings = load("").unwrap();
        assert_eq!(settings.source.module, SourceModule::Live);
        assert_eq!(settings.time.multiplier, 1);
        assert!(settings.chart.bounding_box.is_none());
        assert!(!settings.scale.dynamic);
    }

    #[test]
    fn test_invalid_module() {
        let err = load("[source]\nmodule = radio\n").unwrap_err();
        assert!(err.to_string().contains("source.module"));
    }

    #[test]
    fn test_invalid_port() {
        let err = load("[live]\nport = 70000\n").unwrap_err();
        assert!(err.to_string().contains("live.port"));
    }

    #[test]
    fn test_invalid_zone() {
        let err = load("[chart]\nutm_zone = 61\n").unwrap_err();
        assert!(err.to_string().contains("between 1 and 60"));
    }

    #[test]
    fn test_invalid_time_start() {
        let err = load("[database]\ntime_start = 2024-06-15 12:00\n").unwrap_err();
        assert!(err.to_string().contains("database.time_start"));
    }

    #[test]
    fn test_unknown_column_field() {
        let err = load("[columns]\nspeed = sog\n").unwrap_err();
        assert!(err.to_string().contains("columns.speed"));
    }

    #[test]
    fn test_invalid_bounding_box() {
        assert!(load("[chart]\nbounding_box = 1,2,3\n").is_err());
        assert!(load("[chart]\nbounding_box = 1,2,x,4\n").is_err());
    }

    #[test]
    fn test_invalid_scale_and_multiplier() {
        assert!(load("[scale]\nuser_scale = 0\n").is_err());
        assert!(load("[time]\nmultiplier = 0\n").is_err());
    }

    #[test]
    fn test_unknown_period_falls_back_to_hour() {
        let settings = load("[time]\nperiod = fortnight\nmultiplier = 3\n").unwrap();
        assert_eq!(settings.time.period, HistoryPeriod::Hour);
        assert_eq!(settings.time.multiplier, 3);
        assert_eq!(settings.live_config().ttl, Duration::from_secs(3 * 3_600));

        let settings = load("[time]\nperiod = DAY\n").unwrap();
        assert_eq!(settings.time.period, HistoryPeriod::Day);
    }

    #[test]
    fn test_utm_passthrough() {
        let settings = load("[chart]\ncoordinate_system = utm\n").unwrap();
        assert!(settings.render_config().unwrap().coordinates.is_passthrough());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("On"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("nope"));
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/ships.csv"), home.join("ships.csv"));
        }
    }
}
