//! Canonical in-memory state of one tracked vessel.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::classify::classify;

/// Vessel type as reported by a source.
///
/// Numeric AIS codes are classified into categories; labels are operator
/// overrides that bypass classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ShipType {
    /// AIS ship-type code (0-99 are defined).
    Code(u16),
    /// Pre-resolved category label.
    Label(String),
}

impl ShipType {
    /// Interpret a raw text column: integers become codes, other text a label.
    ///
    /// Returns `None` for empty input.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<u16>() {
            Ok(code) => Some(ShipType::Code(code)),
            Err(_) => Some(ShipType::Label(raw.to_string())),
        }
    }
}

/// Distances from the AIS reference point to the hull extremities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Dimensions {
    pub to_bow: Option<f64>,
    pub to_stern: Option<f64>,
    pub to_port: Option<f64>,
    pub to_starboard: Option<f64>,
}

impl Dimensions {
    pub fn new(to_bow: f64, to_stern: f64, to_port: f64, to_starboard: f64) -> Self {
        Self {
            to_bow: Some(to_bow),
            to_stern: Some(to_stern),
            to_port: Some(to_port),
            to_starboard: Some(to_starboard),
        }
    }

    /// All four distances as `[bow, stern, port, starboard]`, if every one is known.
    pub fn complete(&self) -> Option<[f64; 4]> {
        Some([
            self.to_bow?,
            self.to_stern?,
            self.to_port?,
            self.to_starboard?,
        ])
    }

    pub fn is_empty(&self) -> bool {
        self.to_bow.is_none()
            && self.to_stern.is_none()
            && self.to_port.is_none()
            && self.to_starboard.is_none()
    }
}

/// Latest known state of one vessel, keyed by MMSI.
///
/// The MMSI is fixed at construction; every other field is last-writer-wins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipRecord {
    mmsi: u32,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    /// True heading in degrees; `None` when the source reports it as unknown.
    pub heading: Option<f64>,
    /// Course over ground in degrees.
    pub course: Option<f64>,
    /// Speed over ground in knots.
    pub speed: Option<f64>,
    /// Rate of turn in degrees per minute.
    pub turn_rate: Option<f64>,
    pub ship_type: Option<ShipType>,
    pub dimensions: Dimensions,
    pub destination: Option<String>,
    pub name: Option<String>,
    pub callsign: Option<String>,
    pub ship_name: Option<String>,
    pub imo: Option<u32>,
    pub ais_version: Option<u8>,
    /// AIS message type that last updated this record.
    pub ais_type: Option<u8>,
    pub nav_status: Option<u8>,
    pub last_updated: DateTime<Utc>,
}

impl ShipRecord {
    /// Create an empty record for `mmsi` observed at `last_updated`.
    pub fn new(mmsi: u32, last_updated: DateTime<Utc>) -> Self {
        Self {
            mmsi,
            lon: None,
            lat: None,
            heading: None,
            course: None,
            speed: None,
            turn_rate: None,
            ship_type: None,
            dimensions: Dimensions::default(),
            destination: None,
            name: None,
            callsign: None,
            ship_name: None,
            imo: None,
            ais_version: None,
            ais_type: None,
            nav_status: None,
            last_updated,
        }
    }

    pub fn mmsi(&self) -> u32 {
        self.mmsi
    }

    pub fn with_position(mut self, lon: f64, lat: f64) -> Self {
        self.lon = Some(lon);
        self.lat = Some(lat);
        self
    }

    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn with_ship_type(mut self, ship_type: ShipType) -> Self {
        self.ship_type = Some(ship_type);
        self
    }

    pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Both coordinates, if the vessel has had a position fix.
    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.lon?, self.lat?))
    }

    /// Display category derived from the ship type.
    pub fn category(&self) -> &str {
        classify(self.ship_type.as_ref())
    }

    /// Age of this record relative to `now`; zero for records from the future.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        (now - self.last_updated).max(chrono::Duration::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_new_record_has_no_position() {
        let record = ShipRecord::new(257000001, at(12));
        assert_eq!(record.mmsi(), 257000001);
        assert!(record.position().is_none());
        assert_eq!(record.category(), "default");
    }

    #[test]
    fn test_position_requires_both_coordinates() {
        let mut record = ShipRecord::new(1, at(12));
        record.lon = Some(10.0);
        assert!(record.position().is_none());
        record.lat = Some(60.0);
        assert_eq!(record.position(), Some((10.0, 60.0)));
    }

    #[test]
    fn test_category_follows_ship_type() {
        let record = ShipRecord::new(1, at(12)).with_ship_type(ShipType::Code(70));
        assert_eq!(record.category(), "CARGO");

        let record = ShipRecord::new(1, at(12)).with_ship_type(ShipType::Label("red".into()));
        assert_eq!(record.category(), "red");
    }

    #[test]
    fn test_ship_type_parse() {
        assert_eq!(ShipType::parse("70"), Some(ShipType::Code(70)));
        assert_eq!(ShipType::parse(" 36 "), Some(ShipType::Code(36)));
        assert_eq!(
            ShipType::parse("TANKER_B"),
            Some(ShipType::Label("TANKER_B".into()))
        );
        assert_eq!(ShipType::parse(""), None);
        assert_eq!(ShipType::parse("   "), None);
    }

    #[test]
    fn test_dimensions_complete() {
        assert_eq!(
            Dimensions::new(30.0, 25.0, 5.0, 6.0).complete(),
            Some([30.0, 25.0, 5.0, 6.0])
        );
        let partial = Dimensions {
            to_bow: Some(30.0),
            ..Default::default()
        };
        assert!(partial.complete().is_none());
        assert!(!partial.is_empty());
        assert!(Dimensions::default().is_empty());
    }

    #[test]
    fn test_age_is_never_negative() {
        let record = ShipRecord::new(1, at(13));
        assert_eq!(record.age(at(12)), chrono::Duration::zero());
        assert_eq!(record.age(at(15)), chrono::Duration::hours(2));
    }
}
