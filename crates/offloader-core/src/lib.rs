//! Core types and algorithms for offloader-daq.
//!
//! This crate holds everything between "a device that can read two analog
//! channels" and "a displacement in millimetres":
//!
//! - [`capabilities`] - the device traits drivers implement
//! - [`session`] - scoped, close-exactly-once device ownership
//! - [`sampler`] - fixed-count, fail-fast polling of the two Hall channels
//! - [`data`] - sample sequences and their statistics
//! - [`calibration`] - scale/offset constants and the phase constants
//! - [`estimator`] - arctangent decode with rollover correction
//! - [`engine`] - the `Idle → Sampling → Estimating → Done` run
//! - [`error`] - driver and acquisition errors
//!
//! Drivers live in their own crates (`offloader-driver-mock`,
//! `offloader-driver-comedi`); nothing here touches hardware.

pub mod calibration;
pub mod capabilities;
pub mod data;
pub mod engine;
pub mod error;
pub mod estimator;
pub mod sampler;
pub mod session;

pub use calibration::Calibration;
pub use capabilities::{AnalogDevice, ChannelId, DeviceConnector};
pub use data::{SamplePair, SampleSequence, SampleSet};
pub use engine::{EngineState, PositionEngine, RunOutcome};
pub use error::{AcquisitionError, AcquisitionResult, DriverError, DriverErrorKind};
pub use estimator::{decode_position, DecodedPosition, PositionEstimator, PositionResult};
pub use sampler::{sample, Sampler, SamplerConfig};
pub use session::DeviceSession;
