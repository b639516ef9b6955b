//! Build script for comedi-sys FFI bindings.
//!
//! 1. With `comedi-sdk`: bindgen generates bindings from the system headers
//!    and libcomedi is linked.
//! 2. Without it: stub bindings with the same signatures are written. They
//!    report failure instead of touching hardware, and nothing is linked.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=COMEDI_INCLUDE_DIR");

    let out_path = PathBuf::from(env::var("OUT_DIR").unwrap_or_else(|_| ".".to_string()));

    #[cfg(feature = "comedi-sdk")]
    {
        generate_bindings(&out_path);
        link_comedi();
    }

    #[cfg(not(feature = "comedi-sdk"))]
    write_stub_bindings(&out_path);
}

#[cfg(feature = "comedi-sdk")]
fn link_comedi() {
    // Try pkg-config first
    if pkg_config::probe_library("comedilib").is_ok() {
        return;
    }

    println!("cargo:rustc-link-lib=comedi");
    for path in ["/usr/local/lib", "/usr/lib", "/usr/lib/x86_64-linux-gnu"] {
        let dir = std::path::Path::new(path);
        if dir.join("libcomedi.so").exists() || dir.join("libcomedi.a").exists() {
            println!("cargo:rustc-link-search=native={}", path);
            break;
        }
    }
}

#[cfg(feature = "comedi-sdk")]
fn include_dir() -> String {
    if let Ok(dir) = env::var("COMEDI_INCLUDE_DIR") {
        return dir;
    }
    if let Ok(lib) = pkg_config::probe_library("comedilib") {
        if let Some(path) = lib.include_paths.first() {
            return path.to_string_lossy().to_string();
        }
    }
    ["/usr/local/include", "/usr/include"]
        .into_iter()
        .find(|path| std::path::Path::new(path).join("comedilib.h").exists())
        .unwrap_or("/usr/include")
        .to_string()
}

#[cfg(feature = "comedi-sdk")]
fn generate_bindings(out_path: &std::path::Path) {
    let include_dir = include_dir();
    println!("cargo:rerun-if-changed={}/comedilib.h", include_dir);

    let bindings = bindgen::Builder::default()
        .header_contents("wrapper.h", "#include <comedilib.h>\n")
        .clang_arg(format!("-I{}", include_dir))
        // Device lifetime and diagnostics
        .allowlist_function("comedi_open")
        .allowlist_function("comedi_close")
        .allowlist_function("comedi_errno")
        .allowlist_function("comedi_strerror")
        .allowlist_function("comedi_get_board_name")
        .allowlist_function("comedi_get_driver_name")
        // Analog input
        .allowlist_function("comedi_find_subdevice_by_type")
        .allowlist_function("comedi_get_n_channels")
        .allowlist_function("comedi_get_maxdata")
        .allowlist_function("comedi_get_n_ranges")
        .allowlist_function("comedi_get_range")
        .allowlist_function("comedi_data_read")
        .allowlist_function("comedi_to_phys")
        .allowlist_type("lsampl_t")
        .allowlist_type("comedi_subdevice_type")
        .allowlist_var("AREF_.*")
        // Keep enum constants at top level to match the stub bindings
        .default_enum_style(bindgen::EnumVariation::Consts)
        .derive_debug(true)
        .derive_default(true)
        .derive_copy(true)
        .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()))
        .generate()
        .unwrap_or_else(|err| panic!("Unable to generate comedi bindings: {err}"));

    bindings
        .write_to_file(out_path.join("bindings.rs"))
        .unwrap_or_else(|err| panic!("Couldn't write bindings: {err}"));
}

/// Stub bindings so the workspace builds and tests without comedilib.
#[cfg(not(feature = "comedi-sdk"))]
fn write_stub_bindings(out_path: &std::path::Path) {
    let stub = r#"
// Stub bindings - comedi-sdk feature not enabled.
//
// Same names and signatures as the generated bindings. Every call fails the
// way comedilib reports failure (null handle, -1, 0 maxdata).

use std::os::raw::{c_char, c_int, c_uint, c_void};

/// Opaque handle to a comedi device
pub type comedi_t = c_void;

/// Large sample type (32-bit)
pub type lsampl_t = c_uint;

/// Comedi range structure
#[repr(C)]
#[derive(Debug, Copy, Clone, Default)]
pub struct comedi_range {
    pub min: f64,
    pub max: f64,
    pub unit: c_uint,
}

pub const COMEDI_SUBD_AI: c_uint = 1;

pub const AREF_GROUND: c_uint = 0;
pub const AREF_COMMON: c_uint = 1;
pub const AREF_DIFF: c_uint = 2;
pub const AREF_OTHER: c_uint = 3;

const STUB_MESSAGE: &[u8] = b"comedilib support not compiled in\0";

pub unsafe extern "C" fn comedi_open(_filename: *const c_char) -> *mut comedi_t {
    std::ptr::null_mut()
}

pub unsafe extern "C" fn comedi_close(_dev: *mut comedi_t) -> c_int {
    -1
}

pub unsafe extern "C" fn comedi_errno() -> c_int {
    -1
}

pub unsafe extern "C" fn comedi_strerror(_errnum: c_int) -> *const c_char {
    STUB_MESSAGE.as_ptr().cast()
}

pub unsafe extern "C" fn comedi_get_board_name(_dev: *mut comedi_t) -> *const c_char {
    std::ptr::null()
}

pub unsafe extern "C" fn comedi_get_driver_name(_dev: *mut comedi_t) -> *const c_char {
    std::ptr::null()
}

pub unsafe extern "C" fn comedi_find_subdevice_by_type(
    _dev: *mut comedi_t,
    _type: c_int,
    _start_subdevice: c_uint,
) -> c_int {
    -1
}

pub unsafe extern "C" fn comedi_get_n_channels(_dev: *mut comedi_t, _subdevice: c_uint) -> c_int {
    -1
}

pub unsafe extern "C" fn comedi_get_maxdata(
    _dev: *mut comedi_t,
    _subdevice: c_uint,
    _channel: c_uint,
) -> lsampl_t {
    0
}

pub unsafe extern "C" fn comedi_get_n_ranges(
    _dev: *mut comedi_t,
    _subdevice: c_uint,
    _channel: c_uint,
) -> c_int {
    -1
}

pub unsafe extern "C" fn comedi_get_range(
    _dev: *mut comedi_t,
    _subdevice: c_uint,
    _channel: c_uint,
    _range: c_uint,
) -> *mut comedi_range {
    std::ptr::null_mut()
}

pub unsafe extern "C" fn comedi_data_read(
    _dev: *mut comedi_t,
    _subdevice: c_uint,
    _channel: c_uint,
    _range: c_uint,
    _aref: c_uint,
    _data: *mut lsampl_t,
) -> c_int {
    -1
}

pub unsafe extern "C" fn comedi_to_phys(
    _data: lsampl_t,
    _range: *const comedi_range,
    _maxdata: lsampl_t,
) -> f64 {
    f64::NAN
}
"#;

    let path = out_path.join("bindings.rs");
    if let Err(err) = std::fs::write(&path, stub) {
        panic!("Couldn't write stub bindings to {}: {err}", path.display());
    }
}
