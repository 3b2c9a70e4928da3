//! Live command - follow an AIS feed and print the fleet on every tick.

use std::time::Duration;

use aistrack::source::{LiveStreamAdapter, ShipSource};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::common::print_ships;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the live command.
pub struct LiveArgs {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Stop after this many ticks; run until Ctrl-C when absent.
    pub ticks: Option<u64>,
    pub tick_ms: u64,
}

/// Run the live command.
pub fn run(runner: &CliRunner, args: LiveArgs) -> Result<(), CliError> {
    runner.log_startup("live");
    let settings = runner.settings();

    let mut config = settings.live_config();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    let render = settings.render_config()?;

    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();
    ctrlc::set_handler(move || {
        shutdown_clone.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    runtime.block_on(async move {
        if !runner.json() {
            println!("Connecting to {}...", config.address());
        }
        let source = LiveStreamAdapter::connect(config, render).await?;

        let mut interval = tokio::time::interval(Duration::from_millis(args.tick_ms.max(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks: u64 = 0;
        let mut reported_disconnect = false;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Interrupted, stopping live feed");
                    break;
                }

                _ = interval.tick() => {}
            }

            print_ships(&source.get_ships(), runner.json())?;
            ticks += 1;

            if !source.is_connected() && !reported_disconnect {
                warn!("AIS feed disconnected; showing last known ships");
                if !runner.json() {
                    println!("Feed disconnected. Showing last known ships until they expire.");
                }
                reported_disconnect = true;
            }
            if args.ticks.is_some_and(|limit| ticks >= limit) {
                break;
            }
        }

        source.shutdown();
        Ok::<(), CliError>(())
    })
}
