//! Scoped ownership of an opened acquisition device.
//!
//! A [`DeviceSession`] is the only holder of the device handle for the length
//! of a run. The device is closed exactly once: either through an explicit
//! [`DeviceSession::close`], which reports failure to the caller, or when the
//! session is dropped on an early return, where a failure is logged.

use tracing::{debug, info, warn};

use crate::capabilities::{AnalogDevice, DeviceConnector};
use crate::error::{AcquisitionError, AcquisitionResult};

/// Exclusive, self-closing handle to an [`AnalogDevice`].
pub struct DeviceSession<D: AnalogDevice> {
    device: D,
    closed: bool,
}

impl<D: AnalogDevice> DeviceSession<D> {
    /// Take ownership of an already opened device.
    pub fn new(device: D) -> Self {
        Self {
            device,
            closed: false,
        }
    }

    /// Open a device through `connector`.
    ///
    /// # Errors
    ///
    /// [`AcquisitionError::DeviceOpen`] if the connector fails. Nothing is
    /// left open in that case.
    pub fn open<C>(connector: &C) -> AcquisitionResult<Self>
    where
        C: DeviceConnector<Device = D>,
    {
        let device = connector
            .open_any()
            .map_err(|source| AcquisitionError::DeviceOpen { source })?;
        info!(device = %device.describe(), "Acquisition device opened");
        Ok(Self::new(device))
    }

    /// Mutable access to the device for reading.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Close the device and report the outcome.
    ///
    /// A failure is logged at `warn` and returned as
    /// [`AcquisitionError::DeviceClose`].
    pub fn close(mut self) -> AcquisitionResult<()> {
        self.closed = true;
        match self.device.close() {
            Ok(()) => {
                info!(device = %self.device.describe(), "Acquisition device closed");
                Ok(())
            }
            Err(source) => {
                warn!(device = %self.device.describe(), error = %source, "Failed to close acquisition device");
                Err(AcquisitionError::DeviceClose { source })
            }
        }
    }
}

impl<D: AnalogDevice> Drop for DeviceSession<D> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        debug!(device = %self.device.describe(), "Releasing acquisition device on early exit");
        if let Err(err) = self.device.close() {
            warn!(device = %self.device.describe(), error = %err, "Failed to close acquisition device during cleanup");
        }
    }
}

impl<D: AnalogDevice> std::fmt::Debug for DeviceSession<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSession")
            .field("device", &self.device.describe())
            .field("closed", &self.closed)
            .finish()
    }
}
