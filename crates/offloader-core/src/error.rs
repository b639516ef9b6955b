//! Error types for acquisition and position estimation.
//!
//! Errors are split across two layers:
//!
//! - [`DriverError`] is what a device implementation reports. It carries the
//!   driver name, a coarse [`DriverErrorKind`] and a free-form message, so the
//!   core never depends on a concrete driver's error enum.
//! - [`AcquisitionError`] is what the engine surfaces to callers. Each variant
//!   maps to one failure mode of a run:
//!
//!   - **`DeviceOpen`**: the device could not be opened. Fatal, nothing was
//!     sampled.
//!   - **`DeviceRead`**: a channel read failed mid-run. Fatal to the run, no
//!     partial samples are exposed. The device is still closed.
//!   - **`DeviceClose`**: releasing the device failed. Non-fatal; results
//!     computed before the close are kept.
//!   - **`InvalidSampleCount`**: zero samples were requested or supplied.
//!   - **`InvalidState`**: a run was requested on an engine that is not idle.

use thiserror::Error;

use crate::capabilities::ChannelId;
use crate::engine::EngineState;

// =============================================================================
// Driver Errors
// =============================================================================

/// Coarse classification of a device failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverErrorKind {
    /// Device could not be brought up.
    Initialization,
    /// Bad channel, range or path.
    Configuration,
    /// Link to the device was lost or returned garbage.
    Communication,
    /// The device reported a fault.
    Hardware,
    /// The device did not answer in time.
    Timeout,
    /// The OS refused access to the device.
    Permission,
    /// The backend is not available in this build or on this device.
    NotSupported,
    /// Anything else.
    Unknown,
}

impl std::fmt::Display for DriverErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DriverErrorKind::Initialization => "initialization",
            DriverErrorKind::Configuration => "configuration",
            DriverErrorKind::Communication => "communication",
            DriverErrorKind::Hardware => "hardware",
            DriverErrorKind::Timeout => "timeout",
            DriverErrorKind::Permission => "permission",
            DriverErrorKind::NotSupported => "not_supported",
            DriverErrorKind::Unknown => "unknown",
        };
        write!(f, "{}", label)
    }
}

/// Error reported by an [`AnalogDevice`](crate::capabilities::AnalogDevice)
/// or [`DeviceConnector`](crate::capabilities::DeviceConnector).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Driver '{driver_type}' {kind} error: {message}")]
pub struct DriverError {
    /// Short driver name, e.g. `"comedi"` or `"mock_hall"`.
    pub driver_type: String,
    /// Failure class.
    pub kind: DriverErrorKind,
    /// Human-readable detail.
    pub message: String,
}

impl DriverError {
    /// Create a new driver error.
    pub fn new(
        driver_type: impl Into<String>,
        kind: DriverErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            driver_type: driver_type.into(),
            kind,
            message: message.into(),
        }
    }

    /// True if the device timed out.
    pub fn is_timeout(&self) -> bool {
        self.kind == DriverErrorKind::Timeout
    }
}

// =============================================================================
// Acquisition Errors
// =============================================================================

/// Convenience alias for results of acquisition and estimation.
pub type AcquisitionResult<T> = std::result::Result<T, AcquisitionError>;

/// Failure of an acquisition run or of the estimator's preconditions.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// The acquisition device could not be opened.
    #[error("Failed to open acquisition device: {source}")]
    DeviceOpen {
        /// Underlying driver failure.
        #[source]
        source: DriverError,
    },

    /// A channel read failed while sampling.
    #[error("Failed to read channel {channel} at sample {index}: {source}")]
    DeviceRead {
        /// Channel whose read failed.
        channel: ChannelId,
        /// 1-based sample index at which the read failed.
        index: usize,
        /// Underlying driver failure.
        #[source]
        source: DriverError,
    },

    /// Releasing the acquisition device failed.
    #[error("Failed to close acquisition device: {source}")]
    DeviceClose {
        /// Underlying driver failure.
        #[source]
        source: DriverError,
    },

    /// Zero samples were requested or handed to the estimator.
    #[error("Invalid sample count {count}: at least one sample is required")]
    InvalidSampleCount {
        /// The rejected count.
        count: usize,
    },

    /// A run was requested while the engine was not idle.
    #[error("Cannot start acquisition: engine is {state}")]
    InvalidState {
        /// State the engine was in.
        state: EngineState,
    },
}

impl AcquisitionError {
    /// Whether this error aborts a run.
    ///
    /// Only a failed close is non-fatal: the data was already captured.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AcquisitionError::DeviceClose { .. })
    }

    /// The driver error behind this failure, if any.
    pub fn driver_error(&self) -> Option<&DriverError> {
        match self {
            AcquisitionError::DeviceOpen { source }
            | AcquisitionError::DeviceRead { source, .. }
            | AcquisitionError::DeviceClose { source } => Some(source),
            AcquisitionError::InvalidSampleCount { .. } | AcquisitionError::InvalidState { .. } => {
                None
            }
        }
    }
}
