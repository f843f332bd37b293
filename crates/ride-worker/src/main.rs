//! Ride worker entry point
//!
//! ```bash
//! cargo run -p ride-worker
//! ```

use ride_common::{try_init_tracing, AppConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Worker failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting Ride Worker...");

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        queue = %config.worker.queue_name,
        sweep_interval_secs = config.worker.ride_sweep_interval_secs,
        "Configuration loaded"
    );

    ride_worker::run(config).await?;

    Ok(())
}
