//! Live AIS stream adapter.
//!
//! Two background tasks run on the caller's tokio runtime:
//!
//! - **listener**: reads newline-framed NMEA sentences, decodes them and
//!   folds each report into the [`Tracker`]
//! - **refresher**: on a fixed interval, evicts expired tracks and copies the
//!   remaining ones into the registry with a single `replace_all`
//!
//! The tracker and registry locks are never held together and never held
//! across an `.await`. Connection loss ends the listener; the adapter keeps
//! serving what it has until the tracks expire. Reconnecting is the owner's
//! decision.

mod config;
mod error;
mod tracker;

pub use config::{LiveConfig, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_REFRESH_INTERVAL_MS};
pub use error::LiveError;
pub use tracker::Tracker;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::ais::{MessageDecoder, NmeaDecoder};
use crate::registry::ShipRegistry;
use crate::render::{RenderConfig, RenderPipeline, RenderTuple};
use crate::ship::ShipRecord;

use super::ShipSource;

/// Longest line accepted from the feed before it is discarded.
const MAX_LINE_BYTES: usize = 4096;

/// Ships from a live AIS feed.
///
/// Must be created inside a tokio runtime. Dropping the adapter stops its
/// background tasks.
pub struct LiveStreamAdapter {
    registry: Arc<ShipRegistry>,
    tracker: Arc<Mutex<Tracker>>,
    pipeline: RenderPipeline,
    connected: Arc<AtomicBool>,
    shutdown: CancellationToken,
    address: String,
}

impl LiveStreamAdapter {
    /// Connect to the configured feed and start ingesting.
    pub async fn connect(config: LiveConfig, render: RenderConfig) -> Result<Self, LiveError> {
        let addr = config.address();
        let stream = TcpStream::connect((config.host.as_str(), config.port))
            .await
            .map_err(|source| LiveError::Connect {
                addr: addr.clone(),
                source,
            })?;
        stream.set_nodelay(true)?;

        info!(addr = %addr, "Connected to AIS feed");
        Ok(Self::from_stream(stream, NmeaDecoder::new(), config, render))
    }

    /// Start ingesting from an already-open byte stream.
    pub fn from_stream<R, D>(reader: R, decoder: D, config: LiveConfig, render: RenderConfig) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        D: MessageDecoder + 'static,
    {
        let registry = Arc::new(ShipRegistry::new());
        let tracker = Arc::new(Mutex::new(Tracker::new(config.ttl)));
        let connected = Arc::new(AtomicBool::new(true));
        let shutdown = CancellationToken::new();

        tokio::spawn(listen(
            reader,
            decoder,
            Arc::clone(&tracker),
            Arc::clone(&connected),
            shutdown.clone(),
        ));
        tokio::spawn(refresh_loop(
            Arc::clone(&tracker),
            Arc::clone(&registry),
            config.refresh_interval,
            shutdown.clone(),
        ));

        info!(
            addr = %config.address(),
            refresh_interval_ms = config.refresh_interval.as_millis() as u64,
            ttl_secs = config.ttl.as_secs(),
            "Live AIS adapter started"
        );

        Self {
            registry,
            tracker,
            pipeline: RenderPipeline::new(render),
            connected,
            shutdown,
            address: config.address(),
        }
    }

    /// Whether the feed is still delivering data.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Number of vessels currently tracked (not yet committed to the registry).
    pub fn tracked(&self) -> usize {
        self.tracker.lock().len()
    }

    pub fn registry(&self) -> &ShipRegistry {
        &self.registry
    }

    /// Stop both background tasks. No refresh runs after this returns.
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            info!(addr = %self.address, "Live AIS adapter shutting down");
            self.shutdown.cancel();
        }
    }
}

impl ShipSource for LiveStreamAdapter {
    fn get_ships(&self) -> Vec<RenderTuple> {
        self.pipeline.render(&self.registry.snapshot())
    }

    fn ship(&self, mmsi: u32) -> Option<ShipRecord> {
        self.registry.get(mmsi)
    }

    fn name(&self) -> &'static str {
        "live"
    }
}

impl Drop for LiveStreamAdapter {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn listen<R, D>(
    reader: R,
    mut decoder: D,
    tracker: Arc<Mutex<Tracker>>,
    connected: Arc<AtomicBool>,
    shutdown: CancellationToken,
) where
    R: AsyncRead + Unpin,
    D: MessageDecoder,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::with_capacity(256);
    let mut lines: u64 = 0;
    let mut reports: u64 = 0;
    let mut rejected: u64 = 0;
    // Inside an oversized line; drop bytes until its newline
    let mut discarding = false;

    loop {
        buf.clear();
        let mut limited = (&mut reader).take(MAX_LINE_BYTES as u64 + 1);
        let read = tokio::select! {
            biased;

            _ = shutdown.cancelled() => break,

            read = limited.read_until(b'\n', &mut buf) => read,
        };

        match read {
            Ok(0) => {
                warn!("AIS feed closed the connection");
                break;
            }
            Ok(_) => {
                let complete = buf.last() == Some(&b'\n');
                if discarding {
                    discarding = !complete;
                    continue;
                }
                if !complete && buf.len() > MAX_LINE_BYTES {
                    rejected += 1;
                    discarding = true;
                    trace!(limit = MAX_LINE_BYTES, "Discarding oversized line");
                    continue;
                }
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                lines += 1;

                match decoder.decode(line) {
                    Ok(Some(report)) => {
                        reports += 1;
                        tracker.lock().update(&report, Utc::now());
                    }
                    Ok(None) => {}
                    Err(e) => {
                        rejected += 1;
                        trace!(error = %e, line = %line, "Discarding AIS sentence");
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "AIS feed read failed");
                break;
            }
        }
    }

    connected.store(false, Ordering::Release);
    info!(lines, reports, rejected, "AIS listener stopped");
}

async fn refresh_loop(
    tracker: Arc<Mutex<Tracker>>,
    registry: Arc<ShipRegistry>,
    period: Duration,
    shutdown: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => break,

            _ = interval.tick() => {}
        }

        let (tracks, evicted) = {
            let mut tracker = tracker.lock();
            let evicted = tracker.evict_expired(Utc::now());
            (tracker.tracks(), evicted)
        };
        let count = tracks.len();
        registry.replace_all(tracks);

        debug!(ships = count, evicted, "Registry refreshed from live tracks");
    }

    debug!("Live refresh task stopped");
}
