//! Motor and light rig server.
//!
//! Acquires the hardware (or falls back to the simulated backend), then
//! serves the HTTP API until interrupted.
//!
//! # Build
//!
//! ```bash
//! # Desktop, simulated backend only
//! cargo run --bin rigctl
//!
//! # Raspberry Pi
//! cargo build --release --features rpi
//! ```
//!
//! # Configuration
//!
//! All settings come from `RIG_*` environment variables; see
//! [`rigctl::config`].

use std::sync::Arc;

use anyhow::Context;
use rigctl::services::{run_server, WebServerConfig};
use rigctl::{logging, Config, Rig};

fn main() -> anyhow::Result<()> {
    // Read twice so parse warnings from the second pass reach the logger
    logging::init(Config::from_env().log.level).context("failed to initialise logging")?;
    let config = Config::from_env();

    log::info!("rigctl {}", env!("CARGO_PKG_VERSION"));
    log::debug!("{:?}", config);

    // Acquire before the listener binds: a half-started rig is not a valid state
    let rig = Arc::new(Rig::from_config(&config.hardware));
    log::info!("backend: {:?}", rig.backend_kind());

    let rt = tokio::runtime::Runtime::new().context("failed to create runtime")?;
    rt.block_on(run_server(rig, WebServerConfig::from_config(&config.web)))
        .context("web server failed")?;

    Ok(())
}
