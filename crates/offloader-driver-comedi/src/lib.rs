//! Safe Rust driver for Comedi analog input.
//!
//! This crate wraps the low-level FFI bindings from `comedi-sys` with error
//! handling and RAII resource management, and exposes the board's analog
//! input to the offloader acquisition pipeline.
//!
//! # Architecture
//!
//! - [`ComediDevice`] - exclusively owned device handle, closed on drop
//! - [`AnalogInput`] - analog input subdevice: channels, ranges, reads
//! - [`ComediHallReader`] / [`ComediConnector`] - the acquisition capability
//!   and connector used by `offloader-core`
//!
//! # Features
//!
//! - `hardware`: link comedilib. Without it every open fails with
//!   [`ComediError::Unsupported`], so the crate builds and tests anywhere.
//!
//! # Example
//!
//! ```no_run
//! use offloader_core::{Calibration, PositionEngine, SamplerConfig};
//! use offloader_driver_comedi::ComediConnector;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let connector = ComediConnector::new().with_path("/dev/comedi0");
//! let mut engine = PositionEngine::new(SamplerConfig::default(), Calibration::default());
//! let outcome = engine.run(&connector)?;
//! println!("POS = {:.3} mm", outcome.result.pos);
//! # Ok(())
//! # }
//! ```

pub mod device;
pub mod error;
pub mod hal;
pub mod subsystem;

pub use device::{device_path, ComediDevice, MAX_DEVICE_NODES};
pub use error::{ComediError, OpenFailure, Result};
pub use hal::{ComediConnector, ComediHallReader};
pub use subsystem::analog_input::{linear_to_voltage, AnalogInput};
pub use subsystem::{AnalogReference, Range};
