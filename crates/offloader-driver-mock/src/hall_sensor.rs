//! Simulated quadrature Hall sensor pair.
//!
//! Channel A follows `V0 + A·cos(φ)` and channel B `V0 + A·sin(φ)`, where `φ`
//! is the magnet phase. Feeding those voltages back through
//! [`decode_position`](offloader_core::decode_position) recovers `φ` as the
//! decoder's `θ`.

use offloader_core::calibration::{Calibration, PHASE_ALIGNMENT_RAD, REFERENCE_SHIFT_RAD};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

use crate::common::MockRng;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for [`MockHallSensor`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockSensorConfig {
    /// Magnet phase in radians (default: 0.0). Ignored when `position_mm` is set.
    pub phase_rad: f64,

    /// Target position in the offloader frame (mm). Takes precedence over
    /// `phase_rad`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_mm: Option<f64>,

    /// Signal amplitude around the offset in volts (default: 0.5)
    pub amplitude: f64,

    /// Peak uniform noise added to every reading in volts (default: 0.0)
    pub noise: f64,

    /// RNG seed for reproducible noise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for MockSensorConfig {
    fn default() -> Self {
        Self {
            phase_rad: 0.0,
            position_mm: None,
            amplitude: 0.5,
            noise: 0.0,
            seed: None,
        }
    }
}

/// Magnet phase that decodes to `position_mm` in the offloader frame.
///
/// Positions outside the single turn `(-3π/4·k, 5π/4·k]` wrap into it.
pub fn phase_for_position(position_mm: f64, calibration: &Calibration) -> f64 {
    let unwrapped = position_mm / calibration.k - PHASE_ALIGNMENT_RAD + REFERENCE_SHIFT_RAD;
    let phase = unwrapped.rem_euclid(TAU);
    // The top of the turn belongs to the rollover branch
    let phase = if phase == 0.0 { TAU } else { phase };
    if phase < PI {
        phase
    } else {
        phase - TAU
    }
}

// =============================================================================
// MockHallSensor
// =============================================================================

/// A pair of Hall outputs at a fixed magnet phase.
#[derive(Debug)]
pub struct MockHallSensor {
    phase: f64,
    amplitude: f64,
    offset: f64,
    noise: f64,
    rng: MockRng,
}

impl MockHallSensor {
    /// Noise-free sensor at `phase` radians.
    pub fn at_phase(phase: f64, amplitude: f64, offset: f64) -> Self {
        Self {
            phase,
            amplitude,
            offset,
            noise: 0.0,
            rng: MockRng::new(Some(0)),
        }
    }

    /// Noise-free sensor whose readings decode to `position_mm`.
    pub fn at_position(position_mm: f64, calibration: &Calibration, amplitude: f64) -> Self {
        Self::at_phase(
            phase_for_position(position_mm, calibration),
            amplitude,
            calibration.v0,
        )
    }

    /// Build from configuration. The output offset is the calibration's `V0`.
    pub fn from_config(config: &MockSensorConfig, calibration: &Calibration) -> Self {
        let phase = match config.position_mm {
            Some(position) => phase_for_position(position, calibration),
            None => config.phase_rad,
        };
        Self::at_phase(phase, config.amplitude, calibration.v0)
            .with_noise(config.noise, config.seed)
    }

    /// Add uniform noise of peak `noise` volts drawn from a ChaCha RNG.
    pub fn with_noise(mut self, noise: f64, seed: Option<u64>) -> Self {
        self.noise = noise;
        self.rng = MockRng::new(seed);
        self
    }

    /// Magnet phase in radians.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Output offset in volts.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Noise-free `(A, B)` voltages.
    pub fn ideal_voltages(&self) -> (f64, f64) {
        (
            self.offset + self.amplitude * self.phase.cos(),
            self.offset + self.amplitude * self.phase.sin(),
        )
    }

    /// One reading of channel A.
    pub fn read_a(&self) -> f64 {
        self.ideal_voltages().0 + self.rng.noise(self.noise)
    }

    /// One reading of channel B.
    pub fn read_b(&self) -> f64 {
        self.ideal_voltages().1 + self.rng.noise(self.noise)
    }
}
