//! Calibration constants for the Hall-sensor position decode.
//!
//! The sensor pair produces two voltages that swing around a common offset
//! `V_0` roughly in quadrature. After subtracting the offset they form a
//! point whose phase angle tracks the magnet's travel, and `k` converts that
//! angle into millimetres.

use std::f64::consts::{FRAC_PI_4, PI, TAU};

use serde::{Deserialize, Serialize};

/// Phase alignment between the sensor pair's zero and the mechanical zero.
pub const PHASE_ALIGNMENT_RAD: f64 = FRAC_PI_4;

/// Shift moving the offloader/snubber reading onto its reference convention.
pub const REFERENCE_SHIFT_RAD: f64 = PI;

/// Added when channel B is at or below the offset, so the decoded angle keeps
/// increasing through the arctangent's wrap point.
pub const ROLLOVER_CORRECTION_RAD: f64 = TAU;

/// Default scale: 10 mm of travel per 1.95 rad of phase.
pub const DEFAULT_SCALE_MM_PER_RAD: f64 = 10.0 / 1.95;

/// Default quiescent output of both Hall channels, in volts.
pub const DEFAULT_OFFSET_V: f64 = 1.6316;

/// Scale and offset used to decode position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// Millimetres per radian of decoded phase.
    pub k: f64,
    /// Voltage offset shared by both channels.
    pub v0: f64,
}

impl Calibration {
    /// Create a calibration from explicit constants.
    pub const fn new(k: f64, v0: f64) -> Self {
        Self { k, v0 }
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::new(DEFAULT_SCALE_MM_PER_RAD, DEFAULT_OFFSET_V)
    }
}
