//! Query facade: turns registry snapshots into render tuples.
//!
//! Each record is evaluated on its own into a [`RenderOutcome`]. A record
//! that cannot be drawn is skipped with a reason and never affects the rest
//! of the batch.

use std::fmt;

use serde::Serialize;
use tracing::trace;

use crate::coord::{BoundingBox, CoordinateTransformer};
use crate::ship::{ScaleCalculator, ScaleConfig, ShipRecord};

/// Heading reported for vessels without a usable heading.
pub const NO_HEADING: f64 = 511.0;

/// Largest heading passed through unchanged.
const MAX_HEADING: f64 = 360.0;

/// Display-ready state of one vessel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderTuple {
    pub mmsi: u32,
    /// Planar easting, truncated toward zero.
    pub x: i64,
    /// Planar northing, truncated toward zero.
    pub y: i64,
    /// Degrees in `[0, 360]`, or [`NO_HEADING`].
    pub heading: f64,
    pub color: String,
    pub scale: f64,
}

/// Why a record produced no tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Longitude or latitude never reported.
    MissingPosition,
    /// Coordinates could not be brought into the planar frame.
    TransformFailed,
    /// Transformed point lies outside the viewing box.
    OutOfBounds,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingPosition => write!(f, "missing position"),
            SkipReason::TransformFailed => write!(f, "transform failed"),
            SkipReason::OutOfBounds => write!(f, "out of bounds"),
        }
    }
}

/// Result of evaluating one record.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Render(RenderTuple),
    Skip(SkipReason),
}

/// Normalization settings shared by every adapter.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub coordinates: CoordinateTransformer,
    /// Chart viewing area; `None` disables the bounds filter.
    pub bounds: Option<BoundingBox>,
    pub scale: ScaleConfig,
}

impl RenderConfig {
    pub fn new(coordinates: CoordinateTransformer) -> Self {
        Self {
            coordinates,
            bounds: None,
            scale: ScaleConfig::default(),
        }
    }

    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_scale(mut self, scale: ScaleConfig) -> Self {
        self.scale = scale;
        self
    }
}

/// Transform, filter, classify and scale records for the display.
#[derive(Debug, Clone)]
pub struct RenderPipeline {
    coordinates: CoordinateTransformer,
    bounds: Option<BoundingBox>,
    scale: ScaleCalculator,
}

impl RenderPipeline {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            coordinates: config.coordinates,
            bounds: config.bounds,
            scale: ScaleCalculator::new(config.scale),
        }
    }

    pub fn bounds(&self) -> Option<&BoundingBox> {
        self.bounds.as_ref()
    }

    /// Evaluate a single record.
    pub fn evaluate(&self, record: &ShipRecord) -> RenderOutcome {
        let Some((lon, lat)) = record.position() else {
            return RenderOutcome::Skip(SkipReason::MissingPosition);
        };

        let point = match self.coordinates.try_to_planar(lon, lat) {
            Ok(point) if !point.is_sentinel() => point,
            Ok(_) => return RenderOutcome::Skip(SkipReason::TransformFailed),
            Err(e) => {
                trace!(mmsi = record.mmsi(), error = %e, "Coordinate transform failed");
                return RenderOutcome::Skip(SkipReason::TransformFailed);
            }
        };

        if let Some(bounds) = &self.bounds {
            if !bounds.contains(point.x, point.y) {
                return RenderOutcome::Skip(SkipReason::OutOfBounds);
            }
        }

        let (x, y) = point.truncated();
        RenderOutcome::Render(RenderTuple {
            mmsi: record.mmsi(),
            x,
            y,
            heading: normalize_heading(record.heading),
            color: record.category().to_string(),
            scale: self.scale.scale(&record.dimensions),
        })
    }

    /// Render a batch, preserving input order.
    pub fn render(&self, records: &[ShipRecord]) -> Vec<RenderTuple> {
        let mut skipped = 0usize;
        let tuples: Vec<RenderTuple> = records
            .iter()
            .filter_map(|record| match self.evaluate(record) {
                RenderOutcome::Render(tuple) => Some(tuple),
                RenderOutcome::Skip(reason) => {
                    trace!(mmsi = record.mmsi(), %reason, "Skipping ship");
                    skipped += 1;
                    None
                }
            })
            .collect();

        if skipped > 0 {
            trace!(rendered = tuples.len(), skipped, "Rendered ship batch");
        }
        tuples
    }
}

/// Heading within `[0, 360]`, otherwise [`NO_HEADING`].
fn normalize_heading(heading: Option<f64>) -> f64 {
    match heading {
        Some(h) if (0.0..=MAX_HEADING).contains(&h) => h,
        _ => NO_HEADING,
    }
}
