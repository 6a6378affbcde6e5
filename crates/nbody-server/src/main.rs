//! N-body server binary.
//!
//! Wires the simulation engine, the background stepper, and the observer
//! gateway together and runs them until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `nbody-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Build the multi-thread runtime sized by `runtime.worker_threads`
//! 4. Seed the simulation and start the stepper
//! 5. Serve the gateway until a shutdown signal arrives
//! 6. Stop the engine, cancel every subscription, drain the server

mod error;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use nbody_core::config::{LoggingConfig, NBodyConfig};
use nbody_core::runner::spawn_stepper;
use nbody_gateway::{AppState, ServerConfig, start_server};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::ServerAppError;

/// Configuration file looked up in the working directory.
const CONFIG_PATH: &str = "nbody-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the runtime cannot be
/// built, or the gateway fails to bind.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    init_logging(&config.logging);

    info!(
        particles = config.world.particle_count,
        attractors = config.world.attractors.len(),
        step_interval_ms = config.stepper.step_interval_ms,
        worker_threads = config.runtime.worker_threads,
        "Configuration loaded"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.runtime.worker_threads)
        .enable_all()
        .build()
        .map_err(ServerAppError::from)?;

    runtime.block_on(run(config))?;
    Ok(())
}

/// Run every subsystem until shutdown.
async fn run(config: NBodyConfig) -> Result<(), ServerAppError> {
    let state = Arc::new(AppState::from_config(&config));
    let status = state.simulation.status();
    info!(
        bodies = status.bodies,
        attractors = status.attractors,
        "Simulation seeded"
    );

    let stepper = spawn_stepper(
        Arc::clone(&state.simulation),
        Duration::from_millis(config.stepper.step_interval_ms),
    );

    let shutdown = {
        let state = Arc::clone(&state);
        async move {
            wait_for_signal().await;
            info!("Shutdown signal received");
            state.simulation.stop();
            state.scheduler.shutdown().await;
        }
    };

    let server_config = ServerConfig::from(&config.network);
    let served = start_server(&server_config, Arc::clone(&state), shutdown).await;

    // Also reached when binding fails.
    state.simulation.stop();
    state.scheduler.shutdown().await;
    match stepper.await {
        Ok(steps) => info!(steps, "nbody-server stopped"),
        Err(e) => warn!(error = %e, "Stepper task failed"),
    }

    served?;
    Ok(())
}

/// Load `nbody-config.yaml`, or defaults when the file is missing.
fn load_config() -> Result<NBodyConfig, ServerAppError> {
    let path = Path::new(CONFIG_PATH);
    if path.exists() {
        Ok(NBodyConfig::from_file(path)?)
    } else {
        let mut config = NBodyConfig::default();
        config.network.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Resolve on `Ctrl-C`. If the handler cannot be installed, never resolve.
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
}
