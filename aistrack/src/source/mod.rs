//! Ship source adapters
//!
//! Three interchangeable producers of ship records, each owning one
//! [`ShipRegistry`](crate::registry::ShipRegistry):
//!
//! - [`LiveStreamAdapter`]: AIS sentences over a persistent TCP connection,
//!   committed to the registry on a fixed refresh interval
//! - [`DatabaseAdapter`]: latest position per vessel within a historical window
//! - [`StaticFileAdapter`]: one-shot load of a comma-separated snapshot
//!
//! The display layer talks to all of them through [`ShipSource`].

pub mod database;
pub mod live;
pub mod static_file;

pub use database::{ColumnMapping, DatabaseAdapter, DatabaseConfig, DatabaseError, TimeWindow};
pub use live::{LiveConfig, LiveError, LiveStreamAdapter, Tracker};
pub use static_file::{write_snapshot, StaticFileAdapter, StaticFileConfig, StaticFileError};

use thiserror::Error;

use crate::render::RenderTuple;
use crate::ship::ShipRecord;

/// Capability shared by every source: produce render-ready ships on demand.
pub trait ShipSource: Send + Sync {
    /// Current render tuples. Never fails; returns an empty list when no
    /// ships are known.
    fn get_ships(&self) -> Vec<RenderTuple>;

    /// Full record of one vessel, for detail views.
    fn ship(&self, mmsi: u32) -> Option<ShipRecord>;

    /// Short adapter name used in logs.
    fn name(&self) -> &'static str;
}

/// Errors that make a source unusable.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Live(#[from] LiveError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    StaticFile(#[from] StaticFileError),
}
