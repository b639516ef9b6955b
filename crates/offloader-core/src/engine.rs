//! PositionEngine - one-shot acquisition and estimation run.
//!
//! # State Machine
//!
//! ```text
//! ┌──────┐  run()  ┌──────────┐  samples  ┌────────────┐  result  ┌──────┐
//! │ Idle │────────▶│ Sampling │──────────▶│ Estimating │─────────▶│ Done │
//! └──────┘         └────┬─────┘           └────────────┘          └──────┘
//!                       │ open/read error
//!                       ▼
//!                  ┌────────┐
//!                  │ Failed │
//!                  └────────┘
//! ```
//!
//! `Done` and `Failed` are terminal. A failed run is not retried; build a new
//! engine for the next attempt.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut engine = PositionEngine::new(SamplerConfig::default(), Calibration::default());
//! let outcome = engine.run(&connector)?;
//! println!("POS = {:.3} mm", outcome.result.pos);
//! if let Some(err) = outcome.close_error {
//!     eprintln!("warning: {err}");
//! }
//! ```

use tracing::{error, info, info_span};

use crate::calibration::Calibration;
use crate::capabilities::{ChannelId, DeviceConnector};
use crate::data::SampleSet;
use crate::error::{AcquisitionError, AcquisitionResult};
use crate::estimator::{PositionEstimator, PositionResult};
use crate::sampler::{Sampler, SamplerConfig};
use crate::session::DeviceSession;

/// Engine state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Ready to run
    Idle,
    /// Device open, polling channels
    Sampling,
    /// Samples captured, computing position
    Estimating,
    /// Result produced
    Done,
    /// Acquisition failed
    Failed,
}

impl EngineState {
    /// True for `Done` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, EngineState::Done | EngineState::Failed)
    }
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineState::Idle => write!(f, "idle"),
            EngineState::Sampling => write!(f, "sampling"),
            EngineState::Estimating => write!(f, "estimating"),
            EngineState::Done => write!(f, "done"),
            EngineState::Failed => write!(f, "failed"),
        }
    }
}

/// Everything a successful run produced.
#[derive(Debug)]
pub struct RunOutcome {
    /// Decoded position and channel statistics.
    pub result: PositionResult,
    /// Calibration used for the decode.
    pub calibration: Calibration,
    /// Number of sample pairs acquired.
    pub samples: usize,
    /// Channel averaged into `v1`.
    pub channel_a: ChannelId,
    /// Channel averaged into `v2`.
    pub channel_b: ChannelId,
    /// Set if the device failed to close after sampling. The result is still
    /// valid.
    pub close_error: Option<AcquisitionError>,
}

/// Runs the sampler and the estimator back to back.
#[derive(Debug)]
pub struct PositionEngine {
    sampler: Sampler,
    estimator: PositionEstimator,
    state: EngineState,
}

impl PositionEngine {
    /// Create an idle engine.
    pub fn new(sampler: SamplerConfig, calibration: Calibration) -> Self {
        Self {
            sampler: Sampler::new(sampler),
            estimator: PositionEstimator::new(calibration),
            state: EngineState::Idle,
        }
    }

    /// Current engine state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Open a device, sample it, release it, and estimate position.
    ///
    /// # Errors
    ///
    /// - [`AcquisitionError::InvalidState`] unless the engine is idle.
    /// - [`AcquisitionError::DeviceOpen`], [`AcquisitionError::DeviceRead`] or
    ///   [`AcquisitionError::InvalidSampleCount`] from the sampling phase; the
    ///   engine ends in `Failed` and the device, if opened, is closed.
    ///
    /// A close failure is not an error here; it is returned in
    /// [`RunOutcome::close_error`].
    pub fn run<C: DeviceConnector>(&mut self, connector: &C) -> AcquisitionResult<RunOutcome> {
        if self.state != EngineState::Idle {
            return Err(AcquisitionError::InvalidState { state: self.state });
        }

        let config = self.sampler.config();
        let span = info_span!(
            "position_run",
            samples = config.samples,
            channel_a = %config.channel_a,
            channel_b = %config.channel_b
        );
        let _enter = span.enter();

        self.state = EngineState::Sampling;
        let (samples, close_error) = match self.acquire(connector) {
            Ok(acquired) => acquired,
            Err(err) => {
                self.state = EngineState::Failed;
                error!(error = %err, "Acquisition failed");
                return Err(err);
            }
        };

        self.state = EngineState::Estimating;
        let result = match self.estimator.estimate_set(&samples) {
            Ok(result) => result,
            Err(err) => {
                self.state = EngineState::Failed;
                error!(error = %err, "Estimation failed");
                return Err(err);
            }
        };

        self.state = EngineState::Done;
        info!(
            pos = result.pos,
            pos_os = result.pos_os,
            v1 = result.v1,
            v2 = result.v2,
            "Position estimated"
        );

        Ok(RunOutcome {
            result,
            calibration: *self.estimator.calibration(),
            samples: samples.len(),
            channel_a: samples.channel_a(),
            channel_b: samples.channel_b(),
            close_error,
        })
    }

    /// Sampling phase. The session closes the device on every path out of
    /// here; only an explicit close failure is passed back.
    fn acquire<C: DeviceConnector>(
        &self,
        connector: &C,
    ) -> AcquisitionResult<(SampleSet, Option<AcquisitionError>)> {
        let mut session = DeviceSession::open(connector)?;
        let samples = self.sampler.sample(session.device_mut())?;
        let close_error = session.close().err();
        Ok((samples, close_error))
    }
}
