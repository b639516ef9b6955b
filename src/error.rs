//! Application-level errors.
//!
//! Device and estimation failures come from `offloader-core` as
//! [`AcquisitionError`]; this module adds configuration and backend-selection
//! failures. The binary wraps everything in `anyhow` at the top.

use std::path::PathBuf;

use offloader_core::AcquisitionError;
use thiserror::Error;

use crate::config::Backend;

/// Configuration could not be loaded or is invalid.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist.
    #[error("Configuration file not found: {}", path.display())]
    NotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// Figment could not merge or deserialize the sources.
    #[error("Failed to load configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// A value is out of range.
    #[error("Invalid configuration: {message}")]
    Invalid {
        /// What is wrong.
        message: String,
    },

    /// The effective configuration could not be rendered.
    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// A measurement could not be produced.
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The requested backend is not compiled into this binary.
    #[error("Backend '{backend}' is not available in this build")]
    BackendUnavailable {
        /// Requested backend.
        backend: Backend,
    },

    /// Opening, sampling, or estimating failed.
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    /// The report could not be serialized.
    #[error("Failed to render report: {0}")]
    Report(#[from] serde_json::Error),
}
