//! Acquisition-capability adapters for Comedi analog input.
//!
//! [`ComediHallReader`] implements [`AnalogDevice`] over an opened
//! [`ComediDevice`]; [`ComediConnector`] implements [`DeviceConnector`] by
//! opening a configured node (or scanning for one) and resolving the range.

use offloader_core::capabilities::{AnalogDevice, ChannelId, DeviceConnector};
use offloader_core::error::DriverError;
use tracing::{debug, trace};

use crate::device::ComediDevice;
use crate::error::Result;
use crate::subsystem::analog_input::AnalogInput;
use crate::subsystem::{AnalogReference, Range};

/// Reads Hall-sensor voltages from a Comedi analog input subdevice.
///
/// All channels are read with one range and analog reference.
#[derive(Debug)]
pub struct ComediHallReader {
    device: ComediDevice,
    input: AnalogInput,
    range: Range,
    aref: AnalogReference,
}

impl ComediHallReader {
    /// Wrap an opened device, resolving `range_index` on channel 0.
    pub fn new(device: ComediDevice, range_index: u32, aref: AnalogReference) -> Result<Self> {
        let input = device.analog_input()?;
        let range = input.range_info(&device, 0, range_index)?;
        debug!(
            path = %device.path(),
            subdevice = input.subdevice(),
            range = %range.description(),
            "Comedi analog input ready"
        );
        Ok(Self {
            device,
            input,
            range,
            aref,
        })
    }

    /// Voltage range in use.
    pub fn range(&self) -> &Range {
        &self.range
    }

    /// Analog input subsystem in use.
    pub fn input(&self) -> &AnalogInput {
        &self.input
    }
}

impl AnalogDevice for ComediHallReader {
    fn read_voltage(&mut self, channel: ChannelId) -> std::result::Result<f64, DriverError> {
        let volts = self
            .input
            .read_voltage(&self.device, channel.index(), &self.range, self.aref)?;
        trace!(channel = %channel, volts, "Comedi read");
        Ok(volts)
    }

    fn close(&mut self) -> std::result::Result<(), DriverError> {
        self.device.release().map_err(DriverError::from)
    }

    fn describe(&self) -> String {
        format!("{} at {}", self.device.board_name(), self.device.path())
    }
}

/// Opens [`ComediHallReader`]s.
#[derive(Debug, Clone, Default)]
pub struct ComediConnector {
    path: Option<String>,
    range_index: u32,
    aref: AnalogReference,
}

impl ComediConnector {
    /// Scan `/dev/comedi0..15` and use range 0, ground reference.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open this device node instead of scanning.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Use this range index.
    pub fn with_range_index(mut self, range_index: u32) -> Self {
        self.range_index = range_index;
        self
    }

    /// Use this analog reference.
    pub fn with_aref(mut self, aref: AnalogReference) -> Self {
        self.aref = aref;
        self
    }

    /// Configured device node, if any.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn open_reader(&self) -> Result<ComediHallReader> {
        let device = match &self.path {
            Some(path) => ComediDevice::open(path)?,
            None => ComediDevice::open_any()?,
        };
        ComediHallReader::new(device, self.range_index, self.aref)
    }
}

impl DeviceConnector for ComediConnector {
    type Device = ComediHallReader;

    fn open_any(&self) -> std::result::Result<ComediHallReader, DriverError> {
        self.open_reader().map_err(DriverError::from)
    }
}
