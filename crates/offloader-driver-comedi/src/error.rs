//! Comedi failures and their mapping onto core driver errors.

use std::ffi::CStr;
use std::fmt;

use offloader_core::error::{DriverError, DriverErrorKind};
use thiserror::Error;

/// `Result` with [`ComediError`].
pub type Result<T> = std::result::Result<T, ComediError>;

const ENOENT: i32 = 2;
const EACCES: i32 = 13;
const EBUSY: i32 = 16;
const ENODEV: i32 = 19;

/// Why `comedi_open` refused a device node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenFailure {
    /// The node does not exist or has no board attached.
    Missing,
    /// The process may not open the node.
    AccessDenied,
    /// Another process holds the board.
    Busy,
    /// Any other comedilib error.
    Other {
        /// comedilib errno
        errno: i32,
        /// `comedi_strerror` text
        message: String,
    },
}

impl OpenFailure {
    fn classify(errno: i32, message: String) -> Self {
        match errno {
            ENOENT | ENODEV => OpenFailure::Missing,
            EACCES => OpenFailure::AccessDenied,
            EBUSY => OpenFailure::Busy,
            _ => OpenFailure::Other { errno, message },
        }
    }
}

impl fmt::Display for OpenFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenFailure::Missing => f.write_str("no such device"),
            OpenFailure::AccessDenied => {
                f.write_str("permission denied (check the udev rule for /dev/comedi*)")
            }
            OpenFailure::Busy => f.write_str("in use by another process"),
            OpenFailure::Other { errno, message } => write!(f, "{message} (errno {errno})"),
        }
    }
}

/// Failure of a Comedi call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComediError {
    /// `comedi_open` failed on one node.
    #[error("Cannot open {path}: {reason}")]
    Open {
        /// Device node
        path: String,
        /// What comedilib reported
        reason: OpenFailure,
    },

    /// A scan found no board on any node.
    #[error("No Comedi board on {first} .. {last}")]
    NoBoard {
        /// First node scanned
        first: String,
        /// Last node scanned
        last: String,
    },

    /// The path cannot be passed to C.
    #[error("Device path {path:?} contains a NUL byte")]
    BadPath {
        /// Rejected path
        path: String,
    },

    /// The board has no analog-input subdevice.
    #[error("{path} has no analog-input subdevice")]
    NoAnalogInput {
        /// Device node
        path: String,
    },

    /// Channel index past the end of the subdevice.
    #[error("Channel {channel} does not exist: subdevice {subdevice} has {available} channels")]
    ChannelOutOfRange {
        /// Analog-input subdevice
        subdevice: u32,
        /// Requested channel
        channel: u32,
        /// Channel count
        available: u32,
    },

    /// Range index past the end of the channel's range table.
    #[error("Range {index} does not exist: the channel has {available} ranges")]
    RangeOutOfRange {
        /// Requested range
        index: u32,
        /// Range count
        available: u32,
    },

    /// The handle was already released.
    #[error("{path} is closed")]
    Closed {
        /// Device node
        path: String,
    },

    /// comedilib reported an error.
    #[error("comedilib: {message} (errno {errno})")]
    Library {
        /// comedilib errno
        errno: i32,
        /// `comedi_strerror` text
        message: String,
    },

    /// comedilib returned NULL where a table was expected.
    #[error("{function} returned NULL")]
    NullPointer {
        /// C function name
        function: &'static str,
    },

    /// The build has no comedilib.
    #[error("Comedi is not supported: {reason}")]
    Unsupported {
        /// Why
        reason: &'static str,
    },
}

/// Read comedilib's errno and its message.
///
/// # Safety
///
/// Must be called right after the failing comedilib call on this thread.
unsafe fn last_error() -> (i32, String) {
    let errno = comedi_sys::comedi_errno();
    let text = comedi_sys::comedi_strerror(errno);
    let message = if text.is_null() {
        "unknown error".to_string()
    } else {
        CStr::from_ptr(text).to_string_lossy().into_owned()
    };
    (errno, message)
}

impl ComediError {
    /// The last comedilib error as [`ComediError::Library`].
    ///
    /// # Safety
    ///
    /// Same contract as reading `comedi_errno()`: call it directly after the
    /// failing comedilib call.
    pub(crate) unsafe fn last() -> Self {
        let (errno, message) = last_error();
        Self::Library { errno, message }
    }

    /// The last comedilib error as a failed open of `path`.
    ///
    /// # Safety
    ///
    /// Call directly after a failed `comedi_open`.
    pub(crate) unsafe fn last_open(path: &str) -> Self {
        let (errno, message) = last_error();
        Self::Open {
            path: path.to_string(),
            reason: OpenFailure::classify(errno, message),
        }
    }

    /// Error for builds without comedilib.
    pub(crate) fn sdk_unavailable() -> Self {
        Self::Unsupported {
            reason: "comedilib support not compiled in; rebuild with the `hardware` feature",
        }
    }

    /// No board behind the node, as opposed to a board that refused.
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            Self::NoBoard { .. }
                | Self::Open {
                    reason: OpenFailure::Missing,
                    ..
                }
        )
    }

    fn kind(&self) -> DriverErrorKind {
        match self {
            Self::Open { reason, .. } => match reason {
                OpenFailure::Missing => DriverErrorKind::Initialization,
                OpenFailure::AccessDenied => DriverErrorKind::Permission,
                OpenFailure::Busy => DriverErrorKind::Hardware,
                OpenFailure::Other { .. } => DriverErrorKind::Communication,
            },
            Self::NoBoard { .. } => DriverErrorKind::Initialization,
            Self::BadPath { .. }
            | Self::NoAnalogInput { .. }
            | Self::ChannelOutOfRange { .. }
            | Self::RangeOutOfRange { .. } => DriverErrorKind::Configuration,
            Self::Closed { .. } | Self::Library { .. } | Self::NullPointer { .. } => {
                DriverErrorKind::Communication
            }
            Self::Unsupported { .. } => DriverErrorKind::NotSupported,
        }
    }
}

impl From<ComediError> for DriverError {
    fn from(err: ComediError) -> Self {
        DriverError::new("comedi", err.kind(), err.to_string())
    }
}
