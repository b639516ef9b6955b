//! Position estimation from averaged Hall voltages.
//!
//! The two channel means, offset by `V_0`, are treated as the cosine and sine
//! components of a phase angle:
//!
//! ```text
//! θ        = atan2(V2 - V0, V1 - V0)                 θ ∈ (-π, π]
//! rollover = 0    if V2 - V0 > 0
//!            2π   otherwise
//! POS      = k · (θ + π/4 - π + rollover)            offloader/snubber frame
//! POS_os   = k · (θ + π/4)                           output-shaft frame
//! ```
//!
//! `POS` is continuous over the full travel because the rollover term lifts
//! the lower half-plane above the upper one. `POS_os` keeps the raw wrap.
//!
//! `V2 - V0 == 0` takes the rollover branch (strict `> 0` test).

use serde::Serialize;
use tracing::debug;

use crate::calibration::{
    Calibration, PHASE_ALIGNMENT_RAD, REFERENCE_SHIFT_RAD, ROLLOVER_CORRECTION_RAD,
};
use crate::data::{SampleSequence, SampleSet};
use crate::error::{AcquisitionError, AcquisitionResult};

/// Output of one estimation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionResult {
    /// Position in the offloader/snubber frame, rollover-corrected (mm).
    pub pos: f64,
    /// Position in the output-shaft frame, uncorrected (mm).
    pub pos_os: f64,
    /// Mean of channel A (V).
    pub v1: f64,
    /// Mean of channel B (V).
    pub v2: f64,
    /// Sample standard deviation of channel A (V).
    pub stdev1: f64,
    /// Sample standard deviation of channel B (V).
    pub stdev2: f64,
}

/// Positions decoded from one pair of voltages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedPosition {
    /// Phase angle `atan2(V2 - V0, V1 - V0)`.
    pub theta: f64,
    /// Rollover term applied to `pos`.
    pub rollover: f64,
    /// Offloader/snubber position (mm).
    pub pos: f64,
    /// Output-shaft position (mm).
    pub pos_os: f64,
}

/// Rollover term for an offset channel-B voltage.
pub fn rollover_offset(v2_offset: f64) -> f64 {
    if v2_offset > 0.0 {
        0.0
    } else {
        ROLLOVER_CORRECTION_RAD
    }
}

/// Decode both position conventions from a pair of (mean) voltages.
///
/// Total over finite inputs; NaN inputs yield NaN positions.
pub fn decode_position(v1: f64, v2: f64, calibration: &Calibration) -> DecodedPosition {
    let dv1 = v1 - calibration.v0;
    let dv2 = v2 - calibration.v0;

    let rollover = rollover_offset(dv2);
    let theta = dv2.atan2(dv1);

    DecodedPosition {
        theta,
        rollover,
        pos: calibration.k * (theta + PHASE_ALIGNMENT_RAD - REFERENCE_SHIFT_RAD + rollover),
        pos_os: calibration.k * (theta + PHASE_ALIGNMENT_RAD),
    }
}

/// Converts sampled voltages into a [`PositionResult`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionEstimator {
    calibration: Calibration,
}

impl PositionEstimator {
    /// Estimator using the given calibration.
    pub fn new(calibration: Calibration) -> Self {
        Self { calibration }
    }

    /// Calibration in use.
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Estimate position from two channel sequences.
    ///
    /// # Errors
    ///
    /// [`AcquisitionError::InvalidSampleCount`] if either sequence is empty.
    pub fn estimate(
        &self,
        a: &SampleSequence,
        b: &SampleSequence,
    ) -> AcquisitionResult<PositionResult> {
        let (Some(v1), Some(stdev1)) = (a.mean(), a.std_dev()) else {
            return Err(AcquisitionError::InvalidSampleCount { count: a.len() });
        };
        let (Some(v2), Some(stdev2)) = (b.mean(), b.std_dev()) else {
            return Err(AcquisitionError::InvalidSampleCount { count: b.len() });
        };

        let decoded = decode_position(v1, v2, &self.calibration);
        debug!(
            v1,
            v2,
            theta = decoded.theta,
            rollover = decoded.rollover,
            pos = decoded.pos,
            pos_os = decoded.pos_os,
            "Position decoded"
        );

        Ok(PositionResult {
            pos: decoded.pos,
            pos_os: decoded.pos_os,
            v1,
            v2,
            stdev1,
            stdev2,
        })
    }

    /// Estimate position from a completed [`SampleSet`].
    pub fn estimate_set(&self, samples: &SampleSet) -> AcquisitionResult<PositionResult> {
        self.estimate(samples.a(), samples.b())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    const K: f64 = 10.0 / 1.95;
    const V0: f64 = 1.6316;

    fn cal() -> Calibration {
        Calibration::new(K, V0)
    }

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_upper_half_plane_has_no_rollover() {
        let d = decode_position(V0, V0 + 1.0, &cal());
        assert_eq!(d.rollover, 0.0);
        assert!(close(d.theta, FRAC_PI_2, 1e-12));
        assert!(close(d.pos, K * -FRAC_PI_4, 1e-12));
        assert!(close(d.pos_os, K * 3.0 * FRAC_PI_4, 1e-12));
        assert!(close(d.pos, -4.029, 1e-2));
        assert!(close(d.pos_os, 12.088, 1e-2));
    }

    #[test]
    fn test_lower_half_plane_rolls_over() {
        let d = decode_position(V0, V0 - 1.0, &cal());
        assert_eq!(d.rollover, 2.0 * PI);
        assert!(close(d.theta, -FRAC_PI_2, 1e-12));
        assert!(close(d.pos, K * 5.0 * FRAC_PI_4, 1e-12));
        assert!(close(d.pos_os, K * -FRAC_PI_4, 1e-12));
        assert!(close(d.pos, 20.146, 1e-2));
        assert!(close(d.pos_os, -4.029, 1e-2));
    }

    #[test]
    fn test_channel_b_at_offset_takes_rollover_branch() {
        assert_eq!(rollover_offset(0.0), 2.0 * PI);
        assert_eq!(rollover_offset(-0.0), 2.0 * PI);
        assert_eq!(rollover_offset(f64::MIN_POSITIVE), 0.0);

        // V1 above offset, V2 exactly at offset: θ = 0, still rolls over
        let d = decode_position(V0 + 0.5, V0, &cal());
        assert_eq!(d.theta, 0.0);
        assert_eq!(d.rollover, 2.0 * PI);
        assert!(close(d.pos, K * (FRAC_PI_4 + PI), 1e-12));
        assert!(close(d.pos_os, K * FRAC_PI_4, 1e-12));
    }

    #[test]
    fn test_channel_b_at_offset_with_channel_a_below() {
        // θ = π exactly. The strict test still adds 2π, so POS lands a full
        // turn above its neighbours at this single point.
        let d = decode_position(V0 - 0.5, V0, &cal());
        assert_eq!(d.theta, PI);
        assert_eq!(d.rollover, 2.0 * PI);
        assert!(close(d.pos, K * (FRAC_PI_4 + 2.0 * PI), 1e-12));
        assert!(close(d.pos_os, K * (PI + FRAC_PI_4), 1e-12));
    }

    #[test]
    fn test_pos_is_continuous_across_the_wrap() {
        // Walk the phase through ±π: POS must not jump by k·2π.
        let just_above = decode_position(V0 - 1.0, V0 + 1e-9, &cal());
        let just_below = decode_position(V0 - 1.0, V0 - 1e-9, &cal());
        assert!(close(just_above.pos, just_below.pos, 1e-6));
        // POS_os keeps the discontinuity
        assert!((just_above.pos_os - just_below.pos_os).abs() > K * PI);
    }

    #[test]
    fn test_nan_is_not_masked() {
        let d = decode_position(f64::NAN, V0 + 1.0, &cal());
        assert!(d.pos.is_nan());
        assert!(d.pos_os.is_nan());
        let d = decode_position(V0, f64::NAN, &cal());
        assert!(d.pos.is_nan());
    }

    #[test]
    fn test_identical_pairs_end_to_end() {
        let a = SampleSequence::from(vec![2.0; 100]);
        let b = SampleSequence::from(vec![2.0; 100]);
        let result = PositionEstimator::new(cal()).estimate(&a, &b).unwrap();

        assert_eq!(result.v1, 2.0);
        assert_eq!(result.v2, 2.0);
        assert_eq!(result.stdev1, 0.0);
        assert_eq!(result.stdev2, 0.0);
        assert!(close(result.pos, K * -FRAC_PI_2, 1e-12));
        assert!(close(result.pos_os, K * FRAC_PI_2, 1e-12));
        assert!(close(result.pos, -8.058, 1e-2));
        assert!(close(result.pos_os, 8.058, 1e-2));
    }

    #[test]
    fn test_estimate_is_bit_identical_for_identical_inputs() {
        let a = SampleSequence::from(vec![1.91, 1.93, 1.90, 1.92]);
        let b = SampleSequence::from(vec![1.21, 1.19, 1.20, 1.22]);
        let estimator = PositionEstimator::new(cal());
        let first = estimator.estimate(&a, &b).unwrap();
        let second = estimator.estimate(&a, &b).unwrap();
        assert_eq!(first.pos.to_bits(), second.pos.to_bits());
        assert_eq!(first.pos_os.to_bits(), second.pos_os.to_bits());
        assert_eq!(first.stdev1.to_bits(), second.stdev1.to_bits());
    }

    #[test]
    fn test_empty_sequence_is_rejected() {
        let estimator = PositionEstimator::default();
        let full = SampleSequence::from(vec![2.0]);
        let empty = SampleSequence::default();

        let err = estimator.estimate(&empty, &full).unwrap_err();
        assert!(matches!(err, AcquisitionError::InvalidSampleCount { count: 0 }));
        let err = estimator.estimate(&full, &empty).unwrap_err();
        assert!(matches!(err, AcquisitionError::InvalidSampleCount { count: 0 }));
    }

    #[test]
    fn test_single_sample_has_zero_spread() {
        let a = SampleSequence::from(vec![2.1]);
        let b = SampleSequence::from(vec![1.4]);
        let result = PositionEstimator::new(cal()).estimate(&a, &b).unwrap();
        assert_eq!(result.stdev1, 0.0);
        assert_eq!(result.stdev2, 0.0);
    }
}
