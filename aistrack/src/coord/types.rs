//! Coordinate type definitions

use std::fmt;

/// Valid latitude range
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// UTM zone numbers
pub const MIN_ZONE: u8 = 1;
pub const MAX_ZONE: u8 = 60;

/// A point in the working planar frame (UTM easting/northing, metres).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarPoint {
    /// Easting
    pub x: f64,
    /// Northing
    pub y: f64,
}

impl PlanarPoint {
    /// The pair returned in place of a failed transform.
    pub const SENTINEL: PlanarPoint = PlanarPoint { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Truncates both components toward zero.
    #[inline]
    pub fn truncated(&self) -> (i64, i64) {
        (self.x as i64, self.y as i64)
    }

    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Hemisphere of a UTM zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hemisphere {
    #[default]
    North,
    South,
}

impl Hemisphere {
    /// Parse "north"/"south" (also "n"/"s"), case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "north" | "n" => Some(Hemisphere::North),
            "south" | "s" => Some(Hemisphere::South),
            _ => None,
        }
    }

    /// False northing applied to projected coordinates.
    pub fn false_northing(&self) -> f64 {
        match self {
            Hemisphere::North => 0.0,
            Hemisphere::South => 10_000_000.0,
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hemisphere::North => write!(f, "north"),
            Hemisphere::South => write!(f, "south"),
        }
    }
}

/// Chart viewing area in planar coordinates.
///
/// Bounds are inclusive on every side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a bounding box, swapping corners given in the wrong order.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            min_x: x1.min(x2),
            min_y: y1.min(y2),
            max_x: x1.max(x2),
            max_y: y1.max(y2),
        }
    }

    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Coordinate conversion errors
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude is outside valid range (-90.0 to 90.0)
    InvalidLatitude(f64),
    /// Longitude is outside valid range (-180.0 to 180.0)
    InvalidLongitude(f64),
    /// UTM zone is outside valid range (1 to 60)
    InvalidZone(u8),
    /// Point lies too far from the zone's central meridian to project
    OutsideZone { lon: f64, zone: u8 },
    /// Projection produced a non-finite result
    ProjectionOverflow { lon: f64, lat: f64 },
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => {
                write!(
                    f,
                    "Invalid latitude: {} (must be between {} and {})",
                    lat, MIN_LAT, MAX_LAT
                )
            }
            CoordError::InvalidLongitude(lon) => {
                write!(
                    f,
                    "Invalid longitude: {} (must be between {} and {})",
                    lon, MIN_LON, MAX_LON
                )
            }
            CoordError::InvalidZone(zone) => {
                write!(
                    f,
                    "Invalid UTM zone: {} (must be between {} and {})",
                    zone, MIN_ZONE, MAX_ZONE
                )
            }
            CoordError::OutsideZone { lon, zone } => {
                write!(f, "Longitude {} cannot be projected into UTM zone {}", lon, zone)
            }
            CoordError::ProjectionOverflow { lon, lat } => {
                write!(f, "Projection overflow at lon={}, lat={}", lon, lat)
            }
        }
    }
}

impl std::error::Error for CoordError {}
