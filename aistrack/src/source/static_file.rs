//! Static snapshot adapter.
//!
//! Loads a comma-separated file once. The header row names the columns;
//! recognized names (case-insensitive):
//!
//! | Field   | Headers                        |
//! |---------|--------------------------------|
//! | id      | `id`, `mmsi`                   |
//! | lon     | `lon`, `long`, `longitude`     |
//! | lat     | `lat`, `latitude`              |
//! | heading | `heading`                      |
//! | color   | `color`, `ship_type`, `type`   |
//!
//! Fields may be double-quoted, with `""` standing for a literal quote, so
//! labels can carry commas and line breaks.
//!
//! Rows without an id get sequential ids starting at 1, skipping every id
//! that appears in the file. Rows without a usable position are skipped.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use crate::registry::ShipRegistry;
use crate::render::{RenderConfig, RenderPipeline, RenderTuple};
use crate::ship::{ShipRecord, ShipType};

use super::ShipSource;

/// Header written by [`write_snapshot`].
pub const SNAPSHOT_HEADER: &str = "mmsi,long,lat,heading,color";

/// Errors loading a snapshot file.
#[derive(Debug, Error)]
pub enum StaticFileError {
    #[error("Failed to read ship file: {0}")]
    Io(#[from] io::Error),

    /// The file has no header row.
    #[error("Ship file has no header row")]
    MissingHeader,

    /// A required column is absent from the header.
    #[error("Ship file has no {0} column")]
    MissingColumn(&'static str),
}

/// Configuration for [`StaticFileAdapter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFileConfig {
    pub path: PathBuf,
}

impl StaticFileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Column positions resolved from the header row.
#[derive(Debug)]
struct Columns {
    id: Option<usize>,
    lon: usize,
    lat: usize,
    heading: Option<usize>,
    color: Option<usize>,
}

impl Columns {
    fn from_header(header: &str) -> Result<Self, StaticFileError> {
        let mut id = None;
        let mut lon = None;
        let mut lat = None;
        let mut heading = None;
        let mut color = None;

        for (i, name) in split_record(header).iter().enumerate() {
            let slot = match name.trim().to_lowercase().as_str() {
                "id" | "mmsi" => &mut id,
                "lon" | "long" | "longitude" => &mut lon,
                "lat" | "latitude" => &mut lat,
                "heading" => &mut heading,
                "color" | "ship_type" | "type" => &mut color,
                _ => continue,
            };
            slot.get_or_insert(i);
        }

        Ok(Self {
            id,
            lon: lon.ok_or(StaticFileError::MissingColumn("longitude"))?,
            lat: lat.ok_or(StaticFileError::MissingColumn("latitude"))?,
            heading,
            color,
        })
    }
}

/// Ships loaded once from a snapshot file.
pub struct StaticFileAdapter {
    registry: ShipRegistry,
    pipeline: RenderPipeline,
}

impl StaticFileAdapter {
    pub fn open(config: &StaticFileConfig, render: RenderConfig) -> Result<Self, StaticFileError> {
        Self::load(&config.path, render)
    }

    /// Load ships from a file.
    pub fn load(path: impl AsRef<Path>, render: RenderConfig) -> Result<Self, StaticFileError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let adapter = Self::from_reader(BufReader::new(file), render)?;
        info!(
            path = %path.display(),
            ships = adapter.registry.len(),
            "Loaded static ship file"
        );
        Ok(adapter)
    }

    /// Load ships from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R, render: RenderConfig) -> Result<Self, StaticFileError> {
        let records = read_records(reader)?;
        let registry = ShipRegistry::new();
        registry.replace_all(records);

        Ok(Self {
            registry,
            pipeline: RenderPipeline::new(render),
        })
    }

    pub fn registry(&self) -> &ShipRegistry {
        &self.registry
    }
}

impl ShipSource for StaticFileAdapter {
    fn get_ships(&self) -> Vec<RenderTuple> {
        self.pipeline.render(&self.registry.snapshot())
    }

    fn ship(&self, mmsi: u32) -> Option<ShipRecord> {
        self.registry.get(mmsi)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

fn read_records<R: BufRead>(reader: R) -> Result<Vec<ShipRecord>, StaticFileError> {
    let mut lines = reader.lines();

    let header = loop {
        match lines.next() {
            Some(line) => {
                let line = line?;
                if !line.trim().is_empty() {
                    break line;
                }
            }
            None => return Err(StaticFileError::MissingHeader),
        }
    };
    let columns = Columns::from_header(header.trim_start_matches('\u{feff}'))?;

    let mut skipped = 0usize;
    let mut rows = Vec::new();

    while let Some(line) = lines.next() {
        let mut line = line?;
        if line.trim().is_empty() {
            continue;
        }
        // A quoted field may continue on the following lines
        while has_open_quote(&line) {
            match lines.next() {
                Some(next) => {
                    line.push('\n');
                    line.push_str(&next?);
                }
                None => break,
            }
        }

        let fields = split_record(&line);
        let field = |i: usize| fields.get(i).map(|f| f.trim()).filter(|f| !f.is_empty());
        let number = |i: Option<usize>| i.and_then(field).and_then(|f| f.parse::<f64>().ok());

        let (Some(lon), Some(lat)) = (number(Some(columns.lon)), number(Some(columns.lat))) else {
            skipped += 1;
            continue;
        };

        rows.push(Row {
            id: columns.id.and_then(field).and_then(|f| f.parse::<u32>().ok()),
            lon,
            lat,
            heading: number(columns.heading),
            ship_type: columns.color.and_then(field).and_then(ShipType::parse),
        });
    }

    if skipped > 0 {
        debug!(skipped, "Skipped ship rows without a position");
    }
    Ok(into_records(rows))
}

/// A data row with a usable position.
struct Row {
    id: Option<u32>,
    lon: f64,
    lat: f64,
    heading: Option<f64>,
    ship_type: Option<ShipType>,
}

/// Build records, giving rows without an id the lowest ids no other row uses.
fn into_records(rows: Vec<Row>) -> Vec<ShipRecord> {
    let taken: HashSet<u32> = rows.iter().filter_map(|row| row.id).collect();
    let mut next_id: u32 = 1;
    let now = Utc::now();

    rows.into_iter()
        .map(|row| {
            let mmsi = row.id.unwrap_or_else(|| {
                while taken.contains(&next_id) {
                    next_id += 1;
                }
                let id = next_id;
                next_id += 1;
                id
            });
            let mut record = ShipRecord::new(mmsi, now).with_position(row.lon, row.lat);
            record.heading = row.heading;
            record.ship_type = row.ship_type;
            record
        })
        .collect()
}

/// Split one CSV record into fields, unquoting `"..."` fields.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    quoted = false;
                }
            }
            '"' if field.trim().is_empty() => {
                field.clear();
                quoted = true;
            }
            ',' if !quoted => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

fn has_open_quote(line: &str) -> bool {
    line.chars().filter(|&c| c == '"').count() % 2 == 1
}

/// Quote a field if it contains a separator, quote or line break.
fn quote_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Write records in the snapshot file format.
///
/// Records without a position are written with empty coordinates.
pub fn write_snapshot<W: Write>(records: &[ShipRecord], mut writer: W) -> io::Result<()> {
    writeln!(writer, "{}", SNAPSHOT_HEADER)?;
    for record in records {
        writeln!(
            writer,
            "{},{},{},{},{}",
            record.mmsi(),
            optional(record.lon),
            optional(record.lat),
            optional(record.heading),
            match &record.ship_type {
                Some(ShipType::Code(code)) => code.to_string(),
                Some(ShipType::Label(label)) => quote_field(label),
                None => String::new(),
            }
        )?;
    }
    writer.flush()
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{CoordinateTransformer, Hemisphere};
    use std::io::Cursor;

    fn render_config() -> RenderConfig {
        RenderConfig::new(CoordinateTransformer::utm(32, Hemisphere::North).unwrap())
    }

    fn load(text: &str) -> Result<StaticFileAdapter, StaticFileError> {
        StaticFileAdapter::from_reader(Cursor::new(text.to_string()), render_config())
    }

    #[test]
    fn test_single_row() {
        let adapter = load("id,lon,lat,heading,color\n1,10.5,59.9,45,\n").unwrap();
        let ships = adapter.get_ships();

        assert_eq!(ships.len(), 1);
        assert_eq!(ships[0].mmsi, 1);
        assert_eq!((ships[0].x, ships[0].y), (583914, 6641224));
        assert_eq!(ships[0].heading, 45.0);
        assert_eq!(ships[0].color, "default");
    }

    #[test]
    fn test_rows_without_position_are_skipped() {
        let adapter = load(
            "mmsi,longitude,latitude,heading,color\n\
             10,10.5,59.9,45,70\n\
             11,,59.9,45,70\n\
             12,10.5,north,45,70\n\
             13,10.6,59.8,,TUG\n",
        )
        .unwrap();

        let mmsis: Vec<u32> = adapter.registry().snapshot().iter().map(|r| r.mmsi()).collect();
        assert_eq!(mmsis, vec![10, 13]);
        assert_eq!(adapter.ship(13).unwrap().category(), "TUG");
        assert_eq!(adapter.ship(13).unwrap().heading, None);
        assert_eq!(adapter.ship(10).unwrap().category(), "CARGO");
    }

    #[test]
    fn test_synthetic_ids_when_id_column_missing() {
        let adapter = load("lat,long,heading\n59.9,10.5,10\n59.8,10.4,20\n").unwrap();
        let snapshot = adapter.registry().snapshot();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].mmsi(), 1);
        assert_eq!(snapshot[0].lon, Some(10.5));
        assert_eq!(snapshot[1].mmsi(), 2);
        assert_eq!(snapshot[1].heading, Some(20.0));
    }

    #[test]
    fn test_synthetic_ids_skip_ids_in_file() {
        let adapter = load("id,lon,lat,heading,color\n1,10.0,60.0,10,\n,10.5,59.9,20,\n,10.6,59.8,30,\n3,10.7,59.7,40,\n").unwrap();
        let snapshot = adapter.registry().snapshot();

        let mmsis: Vec<u32> = snapshot.iter().map(|r| r.mmsi()).collect();
        assert_eq!(mmsis, vec![1, 2, 3, 4]);
        assert_eq!(adapter.ship(1).unwrap().lon, Some(10.0));
        assert_eq!(adapter.ship(2).unwrap().lon, Some(10.5));
        assert_eq!(adapter.ship(3).unwrap().lon, Some(10.7));
        assert_eq!(adapter.ship(4).unwrap().lon, Some(10.6));
    }

    #[test]
    fn test_split_record_quoting() {
        assert_eq!(split_record("a,b,,c"), vec!["a", "b", "", "c"]);
        assert_eq!(split_record("1,\"Cargo, hazardous\",x"), vec!["1", "Cargo, hazardous", "x"]);
        assert_eq!(split_record("\"say \"\"hi\"\"\""), vec!["say \"hi\""]);
        assert_eq!(split_record(" \"padded\" ,2"), vec!["padded ", "2"]);
    }

    #[test]
    fn test_quoted_labels_round_trip() {
        let records = vec![
            ShipRecord::new(257000003, Utc::now())
                .with_position(10.5, 59.9)
                .with_ship_type(ShipType::Label("Cargo, hazardous".to_string())),
            ShipRecord::new(257000004, Utc::now())
                .with_position(10.6, 59.8)
                .with_heading(90.0)
                .with_ship_type(ShipType::Label("the \"Tug\"\nline".to_string())),
        ];

        let mut out = Vec::new();
        write_snapshot(&records, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("257000003,10.5,59.9,,\"Cargo, hazardous\"\n"));

        let adapter = load(&text).unwrap();
        assert_eq!(adapter.registry().len(), 2);
        let first = adapter.ship(257000003).unwrap();
        assert_eq!(first.ship_type, Some(ShipType::Label("Cargo, hazardous".to_string())));
        assert_eq!(first.position(), Some((10.5, 59.9)));
        let second = adapter.ship(257000004).unwrap();
        assert_eq!(second.ship_type, Some(ShipType::Label("the \"Tug\"\nline".to_string())));
        assert_eq!(second.heading, Some(90.0));
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(load(""), Err(StaticFileError::MissingHeader)));
        assert!(matches!(load("\n\n"), Err(StaticFileError::MissingHeader)));
    }

    #[test]
    fn test_missing_coordinate_column() {
        assert!(matches!(
            load("id,lat,heading\n1,59.9,45\n"),
            Err(StaticFileError::MissingColumn("longitude"))
        ));
    }

    #[test]
    fn test_write_snapshot_reloads() {
        let records = vec![
            ShipRecord::new(257000001, Utc::now())
                .with_position(10.5, 59.9)
                .with_heading(45.0)
                .with_ship_type(ShipType::Code(70)),
            ShipRecord::new(257000002, Utc::now()).with_position(10.25, 59.75),
        ];

        let mut out = Vec::new();
        write_snapshot(&records, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "mmsi,long,lat,heading,color\n257000001,10.5,59.9,45,70\n257000002,10.25,59.75,,\n"
        );

        let adapter = load(&text).unwrap();
        assert_eq!(adapter.ship(257000001).unwrap().ship_type, Some(ShipType::Code(70)));
        assert_eq!(adapter.ship(257000002).unwrap().position(), Some((10.25, 59.75)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ships.csv");
        std::fs::write(&path, "id,lon,lat,heading,color\n5,10.0,60.0,90,PILOT\n").unwrap();

        let adapter = StaticFileAdapter::open(&StaticFileConfig::new(&path), render_config()).unwrap();
        assert_eq!(adapter.get_ships()[0].color, "PILOT");

        let missing = StaticFileAdapter::load(dir.path().join("absent.csv"), render_config());
        assert!(matches!(missing, Err(StaticFileError::Io(_))));
    }
}
