//! # offloader-daq
//!
//! Application crate for reading the offloader/snubber Hall-sensor position.
//! The acquisition and decoding logic lives in `offloader-core`; this crate
//! wires it to configuration, tracing, a backend, and report output.
//!
//! ## Crate Structure
//!
//! - **`config`**: layered settings (defaults, TOML file, `OFFLOADER_*`
//!   environment, CLI overrides) loaded with `figment`.
//! - **`logging`**: `tracing-subscriber` setup used by the binary.
//! - **`acquisition`**: backend selection and a single measurement run.
//! - **`report`**: text and JSON rendering of a measurement.
//! - **`error`**: `ConfigError` and `AppError`.
//!
//! ## Example
//!
//! ```
//! use offloader_daq::acquisition::measure;
//! use offloader_daq::config::{AppConfig, Backend};
//!
//! let mut config = AppConfig::default();
//! config.device.backend = Backend::Mock;
//! config.mock.position_mm = Some(2.5);
//!
//! let report = measure(&config).unwrap();
//! assert!((report.pos - 2.5).abs() < 1e-9);
//! ```

pub mod acquisition;
pub mod config;
pub mod error;
pub mod logging;
pub mod report;
