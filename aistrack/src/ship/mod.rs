//! Vessel domain types
//!
//! - [`ShipRecord`]: latest known state of one vessel
//! - [`classify`]: ship-type code to display category
//! - [`ScaleCalculator`]: render scale from hull dimensions

mod classify;
mod record;
mod scale;

pub use classify::{classify, ShipCategory, DEFAULT_CATEGORY};
pub use record::{Dimensions, ShipRecord, ShipType};
pub use scale::{ScaleCalculator, ScaleConfig, DEFAULT_USER_SCALE, REFERENCE_DIMENSIONS};
