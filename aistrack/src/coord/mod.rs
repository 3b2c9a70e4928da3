//! Coordinate conversion module
//!
//! Converts geographic vessel positions (longitude/latitude in degrees) into
//! the chart's planar working frame. The projection itself sits behind the
//! [`Projection`] trait; [`UtmProjection`] is the built-in implementation.
//!
//! Malformed upstream positions never fail the caller: [`CoordinateTransformer::to_planar`]
//! returns [`PlanarPoint::SENTINEL`] for anything it cannot project.

mod types;
mod utm;

pub use types::{
    BoundingBox, CoordError, Hemisphere, PlanarPoint, MAX_LAT, MAX_LON, MAX_ZONE, MIN_LAT,
    MIN_LON, MIN_ZONE,
};
pub use utm::{central_meridian, zone_for_longitude, Projection, UtmProjection};

use std::fmt;
use std::sync::Arc;

/// Converts source coordinates into the chart's planar frame.
///
/// Two modes:
/// - geographic: validates degrees and projects them,
/// - passthrough: the source already reports planar values ("utm" mode).
#[derive(Clone)]
pub struct CoordinateTransformer {
    projection: Option<Arc<dyn Projection>>,
}

impl CoordinateTransformer {
    /// Project geographic input with the given projection.
    pub fn geographic(projection: impl Projection + 'static) -> Self {
        Self {
            projection: Some(Arc::new(projection)),
        }
    }

    /// Project geographic input into a UTM zone.
    pub fn utm(zone: u8, hemisphere: Hemisphere) -> Result<Self, CoordError> {
        Ok(Self::geographic(UtmProjection::new(zone, hemisphere)?))
    }

    /// Source values are already planar and pass through unchanged.
    pub fn passthrough() -> Self {
        Self { projection: None }
    }

    pub fn is_passthrough(&self) -> bool {
        self.projection.is_none()
    }

    /// Convert `(lon, lat)` to the planar frame, reporting why a point failed.
    pub fn try_to_planar(&self, lon: f64, lat: f64) -> Result<PlanarPoint, CoordError> {
        let Some(projection) = &self.projection else {
            return Ok(PlanarPoint::new(lon, lat));
        };

        // NaN fails both range checks
        if !(MIN_LON..=MAX_LON).contains(&lon) {
            return Err(CoordError::InvalidLongitude(lon));
        }
        if !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(CoordError::InvalidLatitude(lat));
        }

        projection.forward(lon, lat)
    }

    /// Convert `(lon, lat)` to the planar frame, or [`PlanarPoint::SENTINEL`] on failure.
    pub fn to_planar(&self, lon: f64, lat: f64) -> PlanarPoint {
        self.try_to_planar(lon, lat)
            .unwrap_or(PlanarPoint::SENTINEL)
    }

    /// Convert a planar point back to `(lon, lat)` in degrees.
    pub fn to_geographic(&self, point: PlanarPoint) -> Result<(f64, f64), CoordError> {
        match &self.projection {
            Some(projection) => projection.inverse(point),
            None => Ok((point.x, point.y)),
        }
    }
}

impl fmt::Debug for CoordinateTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinateTransformer")
            .field("passthrough", &self.is_passthrough())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone_32() -> CoordinateTransformer {
        CoordinateTransformer::utm(32, Hemisphere::North).unwrap()
    }

    #[test]
    fn test_valid_position_projects() {
        let p = zone_32().to_planar(10.5, 59.9);
        assert!(!p.is_sentinel());
        assert_eq!(p.truncated(), (583914, 6641224));
    }

    #[test]
    fn test_invalid_longitude_returns_sentinel() {
        let t = zone_32();
        assert_eq!(t.to_planar(180.5, 59.9), PlanarPoint::SENTINEL);
        assert_eq!(t.to_planar(-200.0, 0.0), PlanarPoint::SENTINEL);
        assert!(matches!(
            t.try_to_planar(181.0, 0.0),
            Err(CoordError::InvalidLongitude(_))
        ));
    }

    #[test]
    fn test_invalid_latitude_returns_sentinel() {
        let t = zone_32();
        assert_eq!(t.to_planar(10.0, 91.0), PlanarPoint::SENTINEL);
        assert!(matches!(
            t.try_to_planar(10.0, -90.5),
            Err(CoordError::InvalidLatitude(_))
        ));
    }

    #[test]
    fn test_nan_returns_sentinel() {
        let t = zone_32();
        assert_eq!(t.to_planar(f64::NAN, 59.9), PlanarPoint::SENTINEL);
        assert_eq!(t.to_planar(10.0, f64::NAN), PlanarPoint::SENTINEL);
    }

    #[test]
    fn test_projection_failure_returns_sentinel() {
        // Valid degrees, but on the far side of the globe from zone 32
        let t = zone_32();
        assert_eq!(t.to_planar(-170.0, 10.0), PlanarPoint::SENTINEL);
    }

    #[test]
    fn test_passthrough_keeps_raw_values() {
        let t = CoordinateTransformer::passthrough();
        assert!(t.is_passthrough());
        let p = t.to_planar(583914.7, 6641224.2);
        assert_eq!(p, PlanarPoint::new(583914.7, 6641224.2));
        assert_eq!(t.to_geographic(p).unwrap(), (583914.7, 6641224.2));
    }

    #[test]
    fn test_to_geographic_inverts_projection() {
        let t = zone_32();
        let p = t.to_planar(10.0, 60.0);
        let (lon, lat) = t.to_geographic(p).unwrap();
        assert!((lon - 10.0).abs() < 1e-6);
        assert!((lat - 60.0).abs() < 1e-6);
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_valid_degrees_never_fail_the_caller(
                lon in -180.0..=180.0_f64,
                lat in -90.0..=90.0_f64,
                zone in 1u8..=60
            ) {
                let t = CoordinateTransformer::utm(zone, Hemisphere::North).unwrap();
                let p = t.to_planar(lon, lat);
                prop_assert!(p.is_finite());
            }

            #[test]
            fn test_positions_inside_zone_project(
                offset in -3.0..3.0_f64,
                lat in -84.0..84.0_f64,
                zone in 1u8..=60
            ) {
                let hemisphere = if lat < 0.0 { Hemisphere::South } else { Hemisphere::North };
                let t = CoordinateTransformer::utm(zone, hemisphere).unwrap();
                let lon = central_meridian(zone) + offset;
                let p = t.try_to_planar(lon, lat)?;
                prop_assert!(p.is_finite());
                prop_assert!(!p.is_sentinel());
                prop_assert!(p.x > 0.0 && p.x < 1_000_000.0);
            }

            #[test]
            fn test_out_of_range_degrees_yield_sentinel(
                lon in prop_oneof![-1000.0..-180.001_f64, 180.001..1000.0_f64],
                lat in -1000.0..1000.0_f64,
            ) {
                let t = CoordinateTransformer::utm(32, Hemisphere::North).unwrap();
                prop_assert_eq!(t.to_planar(lon, lat), PlanarPoint::SENTINEL);
            }

            #[test]
            fn test_out_of_range_latitude_yields_sentinel(
                lon in -180.0..=180.0_f64,
                lat in prop_oneof![-1000.0..-90.001_f64, 90.001..1000.0_f64],
            ) {
                let t = CoordinateTransformer::utm(32, Hemisphere::North).unwrap();
                prop_assert_eq!(t.to_planar(lon, lat), PlanarPoint::SENTINEL);
            }
        }
    }
}
