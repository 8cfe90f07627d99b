//! Engine binary for the Daycycle simulation.
//!
//! This is the main entry point that wires together the tick cycle, the
//! headless scene, the HUD and the operator controls. It loads
//! configuration, initializes all subsystems, and runs the simulation
//! loop until a termination condition is met.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `DAYCYCLE_CONFIG` or `daycycle-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the scene registry and the simulation state
//! 4. Hide every scheduled object so the scene matches the schedule
//! 5. Create operator state, Ctrl-C handler and stdin console
//! 6. Run the simulation loop
//! 7. Log the result

mod console;
mod error;
mod hud;

use std::path::PathBuf;
use std::sync::Arc;

use daycycle_core::config::{LoggingConfig, SimulationConfig};
use daycycle_core::operator::OperatorState;
use daycycle_core::runner;
use daycycle_core::scene::SceneRegistry;
use daycycle_core::tick::{self, SimulationState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::hud::HudCallback;

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "DAYCYCLE_CONFIG";

/// Configuration file used when [`CONFIG_ENV`] is unset.
const DEFAULT_CONFIG_PATH: &str = "daycycle-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, logging or setup fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_path) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!("daycycle-engine starting");
    match config_path {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        day_duration_seconds = config.time.day_duration_seconds,
        initial_fraction = config.time.initial_fraction,
        phases = config.skybox.phases.len(),
        scheduled = config.schedule.entries.len(),
        objects = config.scene.objects.len(),
        "Configuration summary"
    );

    // 3. Build scene and simulation state.
    let mut scene = SceneRegistry::from_config(&config.scene)?;
    let mut state = SimulationState::from_config(&config)?;

    // 4. Prepare the scene.
    tick::start(&mut state, &mut scene);

    // 5. Operator controls.
    let operator = Arc::new(OperatorState::new(&config.engine));
    info!(
        max_ticks = operator.max_ticks(),
        max_real_time_seconds = operator.max_real_time_seconds(),
        tick_interval_ms = operator.tick_interval_ms(),
        started_at = %operator.started_at(),
        "Operator state initialized"
    );

    {
        let operator = Arc::clone(&operator);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received");
                    operator.request_stop();
                }
                Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
            }
        });
    }

    if config.engine.console {
        tokio::spawn(console::run_console(Arc::clone(&operator)));
        info!("Operator console reading from stdin");
    }

    // 6. Run the simulation.
    let mut callback = HudCallback::new();
    let result = runner::run_simulation(
        &mut state,
        &mut scene,
        &operator,
        &mut callback,
        config.engine.fixed_delta_seconds,
    )
    .await;

    // 7. Log results.
    runner::log_simulation_end(&result);

    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "daycycle-engine shutdown complete"
    );

    Ok(())
}

/// Load and validate configuration.
///
/// Reads the file named by `DAYCYCLE_CONFIG`, falling back to
/// `daycycle-config.yaml` in the working directory. A missing default
/// file means defaults; a missing explicitly named file is an error.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let path = explicit
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let (config, loaded_from) = if explicit.is_some() || path.exists() {
        (SimulationConfig::from_file(&path)?, Some(path))
    } else {
        (SimulationConfig::default(), None)
    };
    config.validate()?;
    Ok((config, loaded_from))
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| EngineError::Logging {
        message: e.to_string(),
    })
}
