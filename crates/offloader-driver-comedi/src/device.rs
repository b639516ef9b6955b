//! Owned Comedi device handle.
//!
//! [`ComediDevice`] is the only owner of its `comedi_t*`. It is not `Clone`;
//! the handle is released by [`ComediDevice::close`], by
//! [`ComediDevice::release`], or on drop, whichever comes first.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr::NonNull;

use comedi_sys::comedi_t;
use tracing::{debug, info, warn};

use crate::error::{ComediError, Result};
use crate::subsystem::analog_input::AnalogInput;

/// Nodes tried by [`ComediDevice::open_any`]: `/dev/comedi0` through
/// `/dev/comedi15`.
pub const MAX_DEVICE_NODES: u32 = 16;

/// `/dev/comedi{index}`
pub fn device_path(index: u32) -> String {
    format!("/dev/comedi{index}")
}

type BoardString = unsafe extern "C" fn(*mut comedi_t) -> *const c_char;

/// An open Comedi board.
pub struct ComediDevice {
    handle: Option<NonNull<comedi_t>>,
    path: String,
}

impl ComediDevice {
    /// Open the board behind `path`.
    ///
    /// # Errors
    ///
    /// [`ComediError::Open`] with the reason comedilib gave, or
    /// [`ComediError::Unsupported`] in builds without comedilib.
    ///
    /// ```no_run
    /// use offloader_driver_comedi::ComediDevice;
    ///
    /// let device = ComediDevice::open("/dev/comedi0")?;
    /// println!("{} ({})", device.board_name(), device.driver_name());
    /// device.close()?;
    /// # Ok::<(), offloader_driver_comedi::ComediError>(())
    /// ```
    pub fn open(path: &str) -> Result<Self> {
        if !comedi_sys::SDK_AVAILABLE {
            return Err(ComediError::sdk_unavailable());
        }
        let c_path = CString::new(path).map_err(|_| ComediError::BadPath {
            path: path.to_string(),
        })?;

        // SAFETY: c_path is NUL-terminated and outlives the call
        let raw = unsafe { comedi_sys::comedi_open(c_path.as_ptr()) };
        let Some(handle) = NonNull::new(raw) else {
            // SAFETY: read immediately after the failed comedi_open
            return Err(unsafe { ComediError::last_open(path) });
        };

        info!(path, "Opened Comedi device");
        Ok(Self {
            handle: Some(handle),
            path: path.to_string(),
        })
    }

    /// Open the first node in `/dev/comedi0..15` with a board behind it.
    ///
    /// Nodes without a board are skipped. If no node opens, the first
    /// refusal (permission, busy, ...) is returned, else
    /// [`ComediError::NoBoard`].
    pub fn open_any() -> Result<Self> {
        if !comedi_sys::SDK_AVAILABLE {
            return Err(ComediError::sdk_unavailable());
        }

        let mut refused = None;
        for path in (0..MAX_DEVICE_NODES).map(device_path) {
            match Self::open(&path) {
                Ok(device) => return Ok(device),
                Err(err) if err.is_missing() => debug!(path = %path, "No board"),
                Err(err) => {
                    debug!(path = %path, error = %err, "Board refused to open");
                    refused.get_or_insert(err);
                }
            }
        }

        Err(refused.unwrap_or_else(|| ComediError::NoBoard {
            first: device_path(0),
            last: device_path(MAX_DEVICE_NODES - 1),
        }))
    }

    /// Live handle, or [`ComediError::Closed`].
    pub(crate) fn handle(&self) -> Result<*mut comedi_t> {
        match self.handle {
            Some(handle) => Ok(handle.as_ptr()),
            None => Err(ComediError::Closed {
                path: self.path.clone(),
            }),
        }
    }

    /// Node this device was opened from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the handle has been released.
    pub fn is_closed(&self) -> bool {
        self.handle.is_none()
    }

    fn board_string(&self, query: BoardString) -> String {
        let Ok(handle) = self.handle() else {
            return "closed".to_string();
        };
        // SAFETY: handle is open; the string is static inside comedilib
        let text = unsafe { query(handle) };
        if text.is_null() {
            return "unknown".to_string();
        }
        // SAFETY: non-null and NUL-terminated per comedilib
        unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned()
    }

    /// Board model, e.g. `pci-6221`.
    pub fn board_name(&self) -> String {
        self.board_string(comedi_sys::comedi_get_board_name)
    }

    /// Kernel driver, e.g. `ni_pcimio`.
    pub fn driver_name(&self) -> String {
        self.board_string(comedi_sys::comedi_get_driver_name)
    }

    /// First analog-input subdevice.
    pub fn analog_input(&self) -> Result<AnalogInput> {
        AnalogInput::find(self)
    }

    /// Give up the handle and return `comedi_close`'s verdict.
    ///
    /// The handle is gone afterwards even if closing failed; calling again
    /// does nothing.
    pub fn release(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        debug!(path = %self.path, "Closing Comedi device");

        // SAFETY: the handle was taken out of self, so this is its only close
        if unsafe { comedi_sys::comedi_close(handle.as_ptr()) } < 0 {
            // SAFETY: read immediately after the failed comedi_close
            return Err(unsafe { ComediError::last() });
        }
        Ok(())
    }

    /// Release the handle, consuming the device.
    pub fn close(mut self) -> Result<()> {
        self.release()
    }
}

impl Drop for ComediDevice {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            warn!(path = %self.path, error = %err, "Comedi device did not close cleanly");
        }
    }
}

impl std::fmt::Debug for ComediDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComediDevice")
            .field("path", &self.path)
            .field("closed", &self.is_closed())
            .finish()
    }
}
