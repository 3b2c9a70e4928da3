//! Universal Transverse Mercator projection on the WGS84 ellipsoid.
//!
//! Uses the Krüger series (third order in the third flattening `n`), which is
//! accurate to well under a millimetre within a UTM zone and remains stable
//! several zones away from the central meridian.

use super::types::{CoordError, Hemisphere, PlanarPoint, MAX_ZONE, MIN_ZONE};

/// WGS84 semi-major axis (metres).
const WGS84_A: f64 = 6_378_137.0;

/// WGS84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// UTM central meridian scale factor.
const K0: f64 = 0.9996;

/// UTM false easting (metres).
const FALSE_EASTING: f64 = 500_000.0;

/// Points at or beyond this longitude offset from the central meridian
/// have no transverse Mercator image.
const MAX_MERIDIAN_OFFSET_DEG: f64 = 90.0;

/// Geodesic projection capability: geographic degrees to planar metres and back.
pub trait Projection: Send + Sync {
    /// Project `(lon, lat)` in degrees to a planar point.
    fn forward(&self, lon: f64, lat: f64) -> Result<PlanarPoint, CoordError>;

    /// Invert a planar point back to `(lon, lat)` in degrees.
    fn inverse(&self, point: PlanarPoint) -> Result<(f64, f64), CoordError>;
}

/// Series coefficients derived from the ellipsoid, computed once per projection.
#[derive(Debug, Clone, Copy)]
struct KruegerSeries {
    /// Rectifying radius scaled by k0.
    k0_a: f64,
    /// First eccentricity.
    e: f64,
    alpha: [f64; 3],
    beta: [f64; 3],
    delta: [f64; 3],
}

impl KruegerSeries {
    fn wgs84() -> Self {
        let n = WGS84_F / (2.0 - WGS84_F);
        let n2 = n * n;
        let n3 = n2 * n;
        let rectifying = WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0);

        Self {
            k0_a: K0 * rectifying,
            e: 2.0 * n.sqrt() / (1.0 + n),
            alpha: [
                n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
                13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
                61.0 * n3 / 240.0,
            ],
            beta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
                n2 / 48.0 + n3 / 15.0,
                17.0 * n3 / 480.0,
            ],
            delta: [
                2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
                7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
                56.0 * n3 / 15.0,
            ],
        }
    }
}

/// UTM projection fixed to one zone and hemisphere.
#[derive(Debug, Clone, Copy)]
pub struct UtmProjection {
    zone: u8,
    hemisphere: Hemisphere,
    central_meridian: f64,
    series: KruegerSeries,
}

impl UtmProjection {
    /// Create a projection for `zone` (1-60) in `hemisphere`.
    pub fn new(zone: u8, hemisphere: Hemisphere) -> Result<Self, CoordError> {
        if !(MIN_ZONE..=MAX_ZONE).contains(&zone) {
            return Err(CoordError::InvalidZone(zone));
        }
        Ok(Self {
            zone,
            hemisphere,
            central_meridian: central_meridian(zone),
            series: KruegerSeries::wgs84(),
        })
    }

    pub fn zone(&self) -> u8 {
        self.zone
    }

    pub fn hemisphere(&self) -> Hemisphere {
        self.hemisphere
    }

    /// Longitude of the zone's central meridian in degrees.
    pub fn central_meridian(&self) -> f64 {
        self.central_meridian
    }
}

impl Projection for UtmProjection {
    fn forward(&self, lon: f64, lat: f64) -> Result<PlanarPoint, CoordError> {
        let dlon = normalize_offset(lon - self.central_meridian);
        if !(dlon.abs() < MAX_MERIDIAN_OFFSET_DEG) {
            return Err(CoordError::OutsideZone {
                lon,
                zone: self.zone,
            });
        }

        let s = &self.series;
        let phi = lat.to_radians();
        let lambda = dlon.to_radians();

        // Conformal latitude expressed through its tangent
        let sin_phi = phi.sin();
        let t = (sin_phi.atanh() - s.e * (s.e * sin_phi).atanh()).sinh();
        let xi_p = t.atan2(lambda.cos());
        let eta_p = (lambda.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, alpha) in s.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += alpha * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += alpha * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        let point = PlanarPoint::new(
            FALSE_EASTING + s.k0_a * eta,
            self.hemisphere.false_northing() + s.k0_a * xi,
        );

        if point.is_finite() {
            Ok(point)
        } else {
            Err(CoordError::ProjectionOverflow { lon, lat })
        }
    }

    fn inverse(&self, point: PlanarPoint) -> Result<(f64, f64), CoordError> {
        let s = &self.series;
        let xi = (point.y - self.hemisphere.false_northing()) / s.k0_a;
        let eta = (point.x - FALSE_EASTING) / s.k0_a;

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, beta) in s.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_p -= beta * (k * xi).sin() * (k * eta).cosh();
            eta_p -= beta * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_p.sin() / eta_p.cosh()).asin();
        let mut phi = chi;
        for (j, delta) in s.delta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            phi += delta * (k * chi).sin();
        }
        let lambda = eta_p.sinh().atan2(xi_p.cos());

        let lon = normalize_offset(self.central_meridian + lambda.to_degrees());
        let lat = phi.to_degrees();

        if lon.is_finite() && lat.is_finite() {
            Ok((lon, lat))
        } else {
            Err(CoordError::ProjectionOverflow { lon, lat })
        }
    }
}

/// Central meridian of a UTM zone in degrees.
#[inline]
pub fn central_meridian(zone: u8) -> f64 {
    (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0
}

/// UTM zone containing a longitude (ignores the Norway/Svalbard exceptions).
pub fn zone_for_longitude(lon: f64) -> u8 {
    let zone = ((lon + 180.0) / 6.0).floor() as i32 + 1;
    zone.clamp(MIN_ZONE as i32, MAX_ZONE as i32) as u8
}

/// Wrap a longitude difference into [-180, 180].
fn normalize_offset(deg: f64) -> f64 {
    let wrapped = deg % 360.0;
    if wrapped > 180.0 {
        wrapped - 360.0
    } else if wrapped < -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}
