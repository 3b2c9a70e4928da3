//! CLI command implementations.
//!
//! - [`live`] - Follow a live AIS feed
//! - [`history`] - Show a historical window from the database
//! - [`file`] - Show a static snapshot file

pub mod common;
pub mod file;
pub mod history;
pub mod live;
