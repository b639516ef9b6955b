//! Mock Hall-sensor DAQ for offloader-daq
//!
//! This crate simulates the acquisition hardware so the measurement pipeline
//! can run without a Comedi board.
//!
//! # Components
//!
//! - [`MockHallSensor`] - quadrature Hall pair at a fixed phase or target
//!   position, with optional seeded noise
//! - [`MockConnector`] / [`MockHallDevice`] - connector and device serving a
//!   sensor or scripted voltage lists
//! - [`ErrorConfig`] - failure injection on `open`, `read`, and `close`
//! - [`MockProbe`] - shared counters for open/read/close calls
//!
//! ```
//! use offloader_core::{Calibration, PositionEngine, SamplerConfig};
//! use offloader_driver_mock::{MockConnector, MockHallSensor};
//!
//! let cal = Calibration::default();
//! let connector = MockConnector::sensor(MockHallSensor::at_position(7.5, &cal, 0.5));
//! let mut engine = PositionEngine::new(SamplerConfig::default(), cal);
//! let outcome = engine.run(&connector).unwrap();
//! assert!((outcome.result.pos - 7.5).abs() < 1e-9);
//! ```

pub mod common;
mod hall_sensor;
mod mock_daq;

// Re-export common types
pub use common::{ErrorConfig, ErrorScenario, MockRng, Operation};

// Re-export driver types
pub use hall_sensor::{phase_for_position, MockHallSensor, MockSensorConfig};
pub use mock_daq::{MockConnector, MockHallDevice, MockProbe};
