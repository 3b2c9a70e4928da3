//! Historical AIS database adapter.
//!
//! Loads, for a reference time, the most recent observation of every vessel
//! within `[at - period, at]` from a SQLite table. Column names are mapped so
//! the adapter works against differently named schemas.
//!
//! Timestamps are stored as `DD-MM-YYYY HH:MM[:SS]` text, which does not sort
//! lexically, so both sides of every comparison go through a sortable
//! `YYYY-MM-DD HH:MM:SS` key built in SQL.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDateTime;
use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OpenFlags, Row};
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::period::HistoryPeriod;
use crate::registry::ShipRegistry;
use crate::render::{RenderConfig, RenderPipeline, RenderTuple};
use crate::ship::{ShipRecord, ShipType};

use super::ShipSource;

/// Format of query parameters and stored timestamps.
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Accepted when seconds are omitted.
const TIMESTAMP_FORMAT_MINUTES: &str = "%d-%m-%Y %H:%M";

/// Default historical table.
pub const DEFAULT_TABLE: &str = "AisHistory";

/// Errors from the database adapter.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The database could not be opened.
    #[error("Failed to open database {path}: {source}")]
    Connection {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    /// The configured table does not exist.
    #[error("Table {0:?} not found in database")]
    MissingTable(String),

    /// A mapped column does not exist in the table.
    #[error("Column {column:?} (mapped from {field}) not found in table {table:?}")]
    MissingColumn {
        table: String,
        field: &'static str,
        column: String,
    },

    /// A configured table or column name cannot be used as an identifier.
    #[error("Invalid identifier {0:?}")]
    InvalidIdentifier(String),

    /// Preparing or running a query failed.
    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// A timestamp string did not match `DD-MM-YYYY HH:MM[:SS]`.
    #[error("Invalid timestamp {0:?} (expected DD-MM-YYYY HH:MM[:SS])")]
    InvalidTimestamp(String),
}

/// Actual column names for each canonical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub mmsi: String,
    pub latitude: String,
    pub longitude: String,
    pub heading: String,
    /// Ship-type code or pre-resolved category label.
    pub color: String,
    pub timestamp: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            mmsi: "mmsi".to_string(),
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
            heading: "heading".to_string(),
            color: "color".to_string(),
            timestamp: "timestamp".to_string(),
        }
    }
}

impl ColumnMapping {
    /// Override one canonical field. Returns `false` for unknown field names.
    pub fn set(&mut self, field: &str, column: impl Into<String>) -> bool {
        let slot = match field.trim().to_lowercase().as_str() {
            "mmsi" => &mut self.mmsi,
            "latitude" | "lat" => &mut self.latitude,
            "longitude" | "lon" | "long" => &mut self.longitude,
            "heading" => &mut self.heading,
            "color" | "ship_type" => &mut self.color,
            "timestamp" | "time" => &mut self.timestamp,
            _ => return false,
        };
        *slot = column.into();
        true
    }

    /// `(canonical field, column)` pairs in select order.
    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("mmsi", self.mmsi.as_str()),
            ("latitude", self.latitude.as_str()),
            ("longitude", self.longitude.as_str()),
            ("heading", self.heading.as_str()),
            ("color", self.color.as_str()),
            ("timestamp", self.timestamp.as_str()),
        ]
    }
}

/// Configuration for [`DatabaseAdapter`].
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path (or SQLite URI) of the database.
    pub connection_string: String,
    pub table: String,
    pub columns: ColumnMapping,
    pub period: HistoryPeriod,
    /// Window loaded when the adapter opens.
    pub time_start: Option<NaiveDateTime>,
}

impl DatabaseConfig {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            table: DEFAULT_TABLE.to_string(),
            columns: ColumnMapping::default(),
            period: HistoryPeriod::default(),
            time_start: None,
        }
    }
}

/// Closed query window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn start_param(&self) -> String {
        self.start.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start <= t && t <= self.end
    }
}

/// Window ending at `at` and spanning one `period`.
pub fn resolve_window(at: NaiveDateTime, period: HistoryPeriod) -> TimeWindow {
    TimeWindow {
        start: at - period.chrono_duration(),
        end: at,
    }
}

/// Parse `DD-MM-YYYY HH:MM:SS`, or `DD-MM-YYYY HH:MM`.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, DatabaseError> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT_MINUTES))
        .map_err(|_| DatabaseError::InvalidTimestamp(s.to_string()))
}

/// Ships from a historical AIS table.
pub struct DatabaseAdapter {
    connection: Mutex<Connection>,
    query: String,
    period: HistoryPeriod,
    registry: ShipRegistry,
    pipeline: RenderPipeline,
    window: Mutex<Option<TimeWindow>>,
}

impl DatabaseAdapter {
    /// Open the database read-only and check the schema.
    ///
    /// Loads the configured start window, if any, before returning.
    pub fn open(config: DatabaseConfig, render: RenderConfig) -> Result<Self, DatabaseError> {
        let connection = Connection::open_with_flags(
            Path::new(&config.connection_string),
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| DatabaseError::Connection {
            path: config.connection_string.clone(),
            source,
        })?;

        validate_schema(&connection, &config.table, &config.columns)?;
        let query = build_query(&config.table, &config.columns)?;

        info!(
            database = %config.connection_string,
            table = %config.table,
            period = %config.period,
            "Opened AIS history database"
        );

        let adapter = Self {
            connection: Mutex::new(connection),
            query,
            period: config.period,
            registry: ShipRegistry::new(),
            pipeline: RenderPipeline::new(render),
            window: Mutex::new(None),
        };

        if let Some(start) = config.time_start {
            adapter.load_at(start)?;
        }
        Ok(adapter)
    }

    /// Load the window ending at `at` into the registry.
    ///
    /// Returns the number of ships loaded. On error the registry keeps its
    /// previous contents.
    pub fn load_at(&self, at: NaiveDateTime) -> Result<usize, DatabaseError> {
        let window = resolve_window(at, self.period);
        let records = self.query_window(&window)?;
        let count = records.len();

        self.registry.replace_all(records);
        *self.window.lock() = Some(window);

        debug!(
            start = %window.start_param(),
            end = %window.end_param(),
            ships = count,
            "Loaded historical window"
        );
        Ok(count)
    }

    /// [`load_at`](Self::load_at) with a `DD-MM-YYYY HH:MM[:SS]` string.
    pub fn load_at_str(&self, at: &str) -> Result<usize, DatabaseError> {
        self.load_at(parse_timestamp(at)?)
    }

    /// Window of the most recent successful load.
    pub fn window(&self) -> Option<TimeWindow> {
        *self.window.lock()
    }

    pub fn period(&self) -> HistoryPeriod {
        self.period
    }

    pub fn registry(&self) -> &ShipRegistry {
        &self.registry
    }

    fn query_window(&self, window: &TimeWindow) -> Result<Vec<ShipRecord>, DatabaseError> {
        let connection = self.connection.lock();
        let mut stmt = connection.prepare_cached(&self.query)?;
        let rows = stmt.query_map(params![window.start_param(), window.end_param()], |row| {
            Ok(record_from_row(row, window.end))
        })?;

        let mut records = Vec::new();
        for row in rows {
            match row? {
                Some(record) => records.push(record),
                None => trace!("Skipping history row with unusable mmsi"),
            }
        }
        Ok(records)
    }
}

impl ShipSource for DatabaseAdapter {
    fn get_ships(&self) -> Vec<RenderTuple> {
        self.pipeline.render(&self.registry.snapshot())
    }

    fn ship(&self, mmsi: u32) -> Option<ShipRecord> {
        self.registry.get(mmsi)
    }

    fn name(&self) -> &'static str {
        "database"
    }
}

/// Quote an identifier for SQLite.
fn quote_identifier(name: &str) -> Result<String, DatabaseError> {
    let invalid = name.trim().is_empty() || name.contains('"') || name.chars().any(char::is_control);
    if invalid {
        return Err(DatabaseError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("\"{}\"", name))
}

/// SQL expression turning a `DD-MM-YYYY HH:MM[:SS]` value into a sortable
/// `YYYY-MM-DD HH:MM:SS` key. Minute-resolution values get `:00` appended so
/// they compare equal to the same instant written with seconds.
fn sortable_key(expr: &str) -> String {
    format!(
        "(substr({e}, 7, 4) || '-' || substr({e}, 4, 2) || '-' || substr({e}, 1, 2) || substr({e}, 11) \
         || CASE WHEN length({e}) = 16 THEN ':00' ELSE '' END)",
        e = expr
    )
}

fn validate_schema(
    connection: &Connection,
    table: &str,
    columns: &ColumnMapping,
) -> Result<(), DatabaseError> {
    let quoted = quote_identifier(table)?;

    let exists: bool = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1)",
        params![table],
        |row| row.get(0),
    )?;
    if !exists {
        return Err(DatabaseError::MissingTable(table.to_string()));
    }

    let mut stmt = connection.prepare(&format!("PRAGMA table_info({})", quoted))?;
    let present: HashSet<String> = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|name| name.to_lowercase())
        .collect();

    for (field, column) in columns.fields() {
        quote_identifier(column)?;
        if !present.contains(&column.to_lowercase()) {
            return Err(DatabaseError::MissingColumn {
                table: table.to_string(),
                field,
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Latest row per MMSI within `[?1, ?2]`.
fn build_query(table: &str, columns: &ColumnMapping) -> Result<String, DatabaseError> {
    let table = quote_identifier(table)?;
    let mmsi = quote_identifier(&columns.mmsi)?;
    let lat = quote_identifier(&columns.latitude)?;
    let lon = quote_identifier(&columns.longitude)?;
    let heading = quote_identifier(&columns.heading)?;
    let color = quote_identifier(&columns.color)?;
    let ts = quote_identifier(&columns.timestamp)?;

    let row_key = sortable_key(&format!("t.{}", ts));
    let inner_key = sortable_key(&ts);

    Ok(format!(
        "SELECT t.{mmsi}, t.{lon}, t.{lat}, t.{heading}, t.{color}, t.{ts} \
         FROM {table} t \
         JOIN ( \
             SELECT {mmsi} AS latest_mmsi, MAX({inner_key}) AS latest_key \
             FROM {table} \
             WHERE {inner_key} >= {start} AND {inner_key} <= {end} \
             GROUP BY {mmsi} \
         ) latest ON t.{mmsi} = latest.latest_mmsi AND {row_key} = latest.latest_key",
        start = sortable_key("?1"),
        end = sortable_key("?2"),
    ))
}

/// Build a record from `(mmsi, lon, lat, heading, color, timestamp)`.
///
/// Returns `None` when the MMSI is unusable. Other bad values become absent
/// fields.
fn record_from_row(row: &Row<'_>, fallback_time: NaiveDateTime) -> Option<ShipRecord> {
    let value = |i: usize| row.get::<_, Value>(i).unwrap_or(Value::Null);

    let mmsi = as_f64(&value(0))
        .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= u32::MAX as f64)
        .map(|v| v as u32)?;

    let last_updated = match value(5) {
        Value::Text(s) => parse_timestamp(&s).unwrap_or(fallback_time),
        _ => fallback_time,
    };

    let mut record = ShipRecord::new(mmsi, last_updated.and_utc());
    record.lon = as_f64(&value(1));
    record.lat = as_f64(&value(2));
    record.heading = as_f64(&value(3));
    record.ship_type = match value(4) {
        Value::Integer(code) => u16::try_from(code).ok().map(ShipType::Code),
        Value::Real(code) if code.fract() == 0.0 && (0.0..=u16::MAX as f64).contains(&code) => {
            Some(ShipType::Code(code as u16))
        }
        Value::Text(s) => ShipType::parse(&s),
        _ => None,
    };
    Some(record)
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Real(r) if r.is_finite() => Some(*r),
        Value::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}
