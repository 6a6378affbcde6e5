//! Error types for the server binary.
//!
//! [`ServerAppError`] is the top-level error that `main` propagates with
//! `?`; each variant wraps one subsystem's failure.

/// Top-level error for the server binary.
#[derive(Debug, thiserror::Error)]
pub enum ServerAppError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: nbody_core::config::ConfigError,
    },

    /// The Tokio runtime could not be built.
    #[error("runtime error: {source}")]
    Runtime {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The gateway failed to bind or serve.
    #[error("gateway error: {source}")]
    Gateway {
        /// The underlying server error.
        #[from]
        source: nbody_gateway::ServerError,
    },
}
