//! Configuration for the live AIS stream adapter.

use std::time::Duration;

use crate::period::TtlWindow;

/// Default host of the AIS feed.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port (conventional NMEA-over-TCP port).
pub const DEFAULT_PORT: u16 = 10110;

/// Default interval between registry refreshes.
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 1000;

/// Configuration for [`LiveStreamAdapter`](super::LiveStreamAdapter).
#[derive(Debug, Clone, PartialEq)]
pub struct LiveConfig {
    pub host: String,
    pub port: u16,

    /// How often tracked vessels are copied into the registry.
    pub refresh_interval: Duration,

    /// Tracks not updated within this window are dropped.
    pub ttl: Duration,
}

impl LiveConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Take the TTL from a display history window.
    pub fn with_ttl_window(self, window: TtlWindow) -> Self {
        self.with_ttl(window.duration())
    }

    /// `host:port` string used for connecting and logging.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            refresh_interval: Duration::from_millis(DEFAULT_REFRESH_INTERVAL_MS),
            ttl: TtlWindow::default().duration(),
        }
    }
}
