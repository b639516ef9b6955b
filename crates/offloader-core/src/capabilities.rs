//! Device capabilities consumed by the acquisition engine.
//!
//! The engine never talks to a concrete DAQ. It needs exactly two things:
//!
//! - [`DeviceConnector`]: open "any" matching device and hand back an
//!   exclusively owned handle.
//! - [`AnalogDevice`]: read a voltage from a named analog channel, and close.
//!
//! Both traits are synchronous. A read blocks until the device answers or
//! fails; a device-side timeout is reported as a [`DriverError`] like any
//! other failure.
//!
//! # Example
//!
//! ```rust
//! use offloader_core::capabilities::{AnalogDevice, ChannelId};
//! use offloader_core::error::DriverError;
//!
//! struct Bench {
//!     volts: [f64; 2],
//! }
//!
//! impl AnalogDevice for Bench {
//!     fn read_voltage(&mut self, channel: ChannelId) -> Result<f64, DriverError> {
//!         Ok(self.volts[channel.index() as usize])
//!     }
//!
//!     fn close(&mut self) -> Result<(), DriverError> {
//!         Ok(())
//!     }
//! }
//!
//! let mut bench = Bench { volts: [2.0, 1.5] };
//! assert_eq!(bench.read_voltage(ChannelId::new(1)).unwrap(), 1.5);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::DriverError;

// =============================================================================
// Channel Identity
// =============================================================================

/// Analog input channel, displayed as `AIN<n>`.
///
/// Deserializes from either an index (`0`) or a name (`"AIN0"`), and
/// serializes to the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawChannel", into = "String")]
pub struct ChannelId(u32);

impl ChannelId {
    /// Channel with the given zero-based index.
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Zero-based channel index.
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AIN{}", self.0)
    }
}

/// Failure to parse a [`ChannelId`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid channel '{0}': expected AIN<n> or a channel index")]
pub struct ParseChannelError(String);

impl FromStr for ChannelId {
    type Err = ParseChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = match trimmed.get(..3) {
            Some(prefix) if prefix.eq_ignore_ascii_case("ain") => &trimmed[3..],
            _ => trimmed,
        };
        digits
            .parse::<u32>()
            .map(ChannelId)
            .map_err(|_| ParseChannelError(s.to_string()))
    }
}

impl From<ChannelId> for String {
    fn from(channel: ChannelId) -> Self {
        channel.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawChannel {
    Index(u32),
    Name(String),
}

impl TryFrom<RawChannel> for ChannelId {
    type Error = ParseChannelError;

    fn try_from(raw: RawChannel) -> Result<Self, Self::Error> {
        match raw {
            RawChannel::Index(index) => Ok(ChannelId(index)),
            RawChannel::Name(name) => name.parse(),
        }
    }
}

// =============================================================================
// Device Traits
// =============================================================================

/// An opened analog acquisition device.
///
/// Implementations own their handle exclusively. Callers should not read after
/// a successful or failed [`close`](AnalogDevice::close); wrap the device in a
/// [`DeviceSession`](crate::session::DeviceSession) to get that guarantee.
pub trait AnalogDevice {
    /// Read one voltage from `channel`.
    fn read_voltage(&mut self, channel: ChannelId) -> Result<f64, DriverError>;

    /// Release the device handle.
    fn close(&mut self) -> Result<(), DriverError>;

    /// Short description for logs (board name, path, ...).
    fn describe(&self) -> String {
        "analog device".to_string()
    }
}

impl<D: AnalogDevice + ?Sized> AnalogDevice for Box<D> {
    fn read_voltage(&mut self, channel: ChannelId) -> Result<f64, DriverError> {
        (**self).read_voltage(channel)
    }

    fn close(&mut self) -> Result<(), DriverError> {
        (**self).close()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Opens acquisition devices.
pub trait DeviceConnector {
    /// Device type produced by this connector.
    type Device: AnalogDevice;

    /// Open the first available matching device.
    fn open_any(&self) -> Result<Self::Device, DriverError>;
}
