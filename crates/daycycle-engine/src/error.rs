//! Error types for the Daycycle engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: daycycle_core::config::ConfigError,
    },

    /// Simulation state construction failed.
    #[error("setup error: {source}")]
    Setup {
        /// The underlying setup error.
        #[from]
        source: daycycle_core::tick::SetupError,
    },

    /// Scene construction failed.
    #[error("scene error: {source}")]
    Scene {
        /// The underlying scene error.
        #[from]
        source: daycycle_core::scene::SceneError,
    },

    /// The log subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the logging failure.
        message: String,
    },
}
