//! Analog-input subdevice.
//!
//! [`AnalogInput`] is a plain descriptor. Calls that touch the board borrow
//! the [`ComediDevice`] it came from, so the handle never leaves the device.

use comedi_sys::lsampl_t;
use tracing::debug;

use crate::device::ComediDevice;
use crate::error::{ComediError, Result};
use crate::subsystem::{AnalogReference, Range};

/// Scale a raw code onto `range` assuming a linear ADC.
///
/// Fallback for boards whose range table comedilib cannot return. NaN when
/// `maxdata` is zero.
pub fn linear_to_voltage(raw: lsampl_t, maxdata: lsampl_t, range: &Range) -> f64 {
    if maxdata == 0 {
        return f64::NAN;
    }
    range.min + range.span() * f64::from(raw) / f64::from(maxdata)
}

/// Location and geometry of the board's analog inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalogInput {
    subdevice: u32,
    n_channels: u32,
    maxdata: lsampl_t,
}

impl AnalogInput {
    pub(crate) fn find(device: &ComediDevice) -> Result<Self> {
        let handle = device.handle()?;

        // SAFETY: handle stays open while `device` is borrowed
        let found = unsafe {
            comedi_sys::comedi_find_subdevice_by_type(handle, comedi_sys::COMEDI_SUBD_AI as _, 0)
        };
        let Ok(subdevice) = u32::try_from(found) else {
            return Err(ComediError::NoAnalogInput {
                path: device.path().to_string(),
            });
        };

        // SAFETY: subdevice index came from comedilib
        let channels = unsafe { comedi_sys::comedi_get_n_channels(handle, subdevice) };
        let Ok(n_channels) = u32::try_from(channels) else {
            // SAFETY: read immediately after the failed call
            return Err(unsafe { ComediError::last() });
        };
        // SAFETY: as above; channel 0 exists when n_channels > 0
        let maxdata = unsafe { comedi_sys::comedi_get_maxdata(handle, subdevice, 0) };

        debug!(subdevice, n_channels, maxdata, "Analog input subdevice");
        Ok(Self {
            subdevice,
            n_channels,
            maxdata,
        })
    }

    /// Subdevice index on the board.
    pub fn subdevice(&self) -> u32 {
        self.subdevice
    }

    /// Channel count.
    pub fn n_channels(&self) -> u32 {
        self.n_channels
    }

    /// Largest raw code.
    pub fn maxdata(&self) -> lsampl_t {
        self.maxdata
    }

    /// ADC resolution in bits.
    pub fn resolution_bits(&self) -> u32 {
        (u64::from(self.maxdata) + 1).ilog2()
    }

    fn check_channel(&self, channel: u32) -> Result<()> {
        if channel < self.n_channels {
            Ok(())
        } else {
            Err(ComediError::ChannelOutOfRange {
                subdevice: self.subdevice,
                channel,
                available: self.n_channels,
            })
        }
    }

    /// Number of input ranges `channel` supports.
    pub fn n_ranges(&self, device: &ComediDevice, channel: u32) -> Result<u32> {
        self.check_channel(channel)?;
        let handle = device.handle()?;

        // SAFETY: open handle, validated channel
        let n = unsafe { comedi_sys::comedi_get_n_ranges(handle, self.subdevice, channel) };
        // SAFETY: read immediately after the failed call
        u32::try_from(n).map_err(|_| unsafe { ComediError::last() })
    }

    /// Range `index` of `channel`.
    pub fn range_info(&self, device: &ComediDevice, channel: u32, index: u32) -> Result<Range> {
        let available = self.n_ranges(device, channel)?;
        if index >= available {
            return Err(ComediError::RangeOutOfRange { index, available });
        }

        let handle = device.handle()?;
        // SAFETY: open handle, validated channel and range
        let table = unsafe { comedi_sys::comedi_get_range(handle, self.subdevice, channel, index) };
        // SAFETY: comedilib returns NULL or a pointer into its range table
        unsafe { Range::from_ptr(index, table) }.ok_or(ComediError::NullPointer {
            function: "comedi_get_range",
        })
    }

    /// One raw conversion on `channel`.
    pub fn read_raw(
        &self,
        device: &ComediDevice,
        channel: u32,
        range: u32,
        aref: AnalogReference,
    ) -> Result<lsampl_t> {
        self.check_channel(channel)?;
        let handle = device.handle()?;

        let mut code: lsampl_t = 0;
        // SAFETY: open handle; `code` outlives the call
        let status = unsafe {
            comedi_sys::comedi_data_read(
                handle,
                self.subdevice,
                channel,
                range,
                aref.to_raw(),
                &mut code,
            )
        };
        if status < 0 {
            // SAFETY: read immediately after the failed call
            return Err(unsafe { ComediError::last() });
        }
        Ok(code)
    }

    /// One conversion on `channel`, in volts.
    pub fn read_voltage(
        &self,
        device: &ComediDevice,
        channel: u32,
        range: &Range,
        aref: AnalogReference,
    ) -> Result<f64> {
        let raw = self.read_raw(device, channel, range.index, aref)?;
        self.raw_to_voltage(device, channel, raw, range)
    }

    /// Convert a raw code with `comedi_to_phys`, or linearly when the board
    /// has no range table. Codes at the rails convert to NaN.
    pub fn raw_to_voltage(
        &self,
        device: &ComediDevice,
        channel: u32,
        raw: lsampl_t,
        range: &Range,
    ) -> Result<f64> {
        let handle = device.handle()?;

        // SAFETY: open handle; the table belongs to comedilib
        let table =
            unsafe { comedi_sys::comedi_get_range(handle, self.subdevice, channel, range.index) };
        if table.is_null() {
            return Ok(linear_to_voltage(raw, self.maxdata, range));
        }
        // SAFETY: table is non-null and valid for this subdevice
        Ok(unsafe { comedi_sys::comedi_to_phys(raw, table, self.maxdata) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIXTEEN_BIT: AnalogInput = AnalogInput {
        subdevice: 0,
        n_channels: 16,
        maxdata: 65535,
    };

    #[test]
    fn test_linear_scaling_over_bipolar_range() {
        let range = Range::new(0, -10.0, 10.0);
        assert_eq!(linear_to_voltage(0, 65535, &range), -10.0);
        assert_eq!(linear_to_voltage(65535, 65535, &range), 10.0);
        assert!(linear_to_voltage(32768, 65535, &range).abs() < 1e-3);
        assert!(linear_to_voltage(1, 0, &range).is_nan());
    }

    #[test]
    fn test_resolution_bits() {
        assert_eq!(SIXTEEN_BIT.resolution_bits(), 16);
        let twelve = AnalogInput {
            maxdata: 4095,
            ..SIXTEEN_BIT
        };
        assert_eq!(twelve.resolution_bits(), 12);
    }

    #[test]
    fn test_channel_bounds() {
        assert!(SIXTEEN_BIT.check_channel(0).is_ok());
        assert!(SIXTEEN_BIT.check_channel(15).is_ok());
        assert_eq!(
            SIXTEEN_BIT.check_channel(16),
            Err(ComediError::ChannelOutOfRange {
                subdevice: 0,
                channel: 16,
                available: 16,
            })
        );
    }
}
