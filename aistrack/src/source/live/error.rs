//! Error types for the live stream adapter.

use thiserror::Error;

/// Errors that prevent a live adapter from starting.
#[derive(Debug, Error)]
pub enum LiveError {
    /// The AIS feed refused or timed out the connection.
    #[error("Failed to connect to AIS feed at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure on an established stream.
    #[error("AIS stream I/O error: {0}")]
    Io(#[from] std::io::Error),
}
