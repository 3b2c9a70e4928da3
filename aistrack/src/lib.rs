//! aistrack - AIS vessel ingestion for chart displays
//!
//! Vessel positions arrive from one of three sources (a live NMEA feed, a
//! SQLite history table or a static CSV snapshot). Each source keeps its own
//! [`registry::ShipRegistry`]; the query facade turns a registry snapshot into
//! render tuples of planar position, heading, category and scale.
//!
//! ```no_run
//! use aistrack::coord::{CoordinateTransformer, Hemisphere};
//! use aistrack::render::RenderConfig;
//! use aistrack::source::{ShipSource, StaticFileAdapter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let render = RenderConfig::new(CoordinateTransformer::utm(32, Hemisphere::North)?);
//! let source = StaticFileAdapter::load("ships.csv", render)?;
//! for ship in source.get_ships() {
//!     println!("{} {} {} {}", ship.mmsi, ship.x, ship.y, ship.color);
//! }
//! # Ok(())
//! # }
//! ```

pub mod ais;
pub mod config;
pub mod coord;
pub mod logging;
pub mod period;
pub mod registry;
pub mod render;
pub mod ship;
pub mod source;
