//! Low-level FFI bindings for the comedilib analog-input calls.
//!
//! Comedi is the Linux kernel driver collection for DAQ boards; comedilib is
//! its user-space library. Only the calls needed for polled single-sample
//! analog input are bound: open/close, error reporting, analog-input subdevice
//! discovery, range lookup, `comedi_data_read`, and `comedi_to_phys`.
//!
//! # Safety
//!
//! All functions in this crate are `unsafe` as they are direct FFI bindings.
//! For a safe wrapper, use the `offloader-driver-comedi` crate instead.
//!
//! # Features
//!
//! - `comedi-sdk`: Generate bindings from system comedilib headers and link
//!   libcomedi. Without it, stub bindings with identical signatures are used;
//!   they fail every call and [`SDK_AVAILABLE`] is `false`.
//!
//! # Example (unsafe)
//!
//! ```no_run
//! use comedi_sys::*;
//! use std::ffi::CString;
//!
//! let path = CString::new("/dev/comedi0").unwrap();
//! unsafe {
//!     let dev = comedi_open(path.as_ptr());
//!     if !dev.is_null() {
//!         let subdev = comedi_find_subdevice_by_type(dev, COMEDI_SUBD_AI as _, 0);
//!         println!("Analog input subdevice: {}", subdev);
//!         comedi_close(dev);
//!     }
//! }
//! ```

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(dead_code)]
#![allow(unsafe_code)]
#![allow(missing_docs)]
#![allow(clippy::all)]

// Include the generated bindings
include!(concat!(env!("OUT_DIR"), "/bindings.rs"));

// bindgen prefixes enum variants with the enum name; the stubs use flat names
#[cfg(feature = "comedi-sdk")]
pub use comedi_subdevice_type_COMEDI_SUBD_AI as COMEDI_SUBD_AI;

/// Whether real comedilib is linked.
pub const SDK_AVAILABLE: bool = cfg!(feature = "comedi-sdk");
