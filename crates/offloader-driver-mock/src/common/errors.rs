//! Fault injection for the mock DAQ.
//!
//! An [`ErrorConfig`] is consulted before every [`Operation`] a mock device
//! performs and turns configured faults into core [`DriverError`]s.

use std::fmt;
use std::sync::Arc;

use offloader_core::error::{DriverError, DriverErrorKind};
use parking_lot::Mutex;

use super::rng::MockRng;
use crate::mock_daq::DRIVER_TYPE;

/// Device operation a fault can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `DeviceConnector::open_any`
    Open,
    /// `AnalogDevice::read_voltage`
    Read,
    /// `AnalogDevice::close`
    Close,
}

impl Operation {
    const COUNT: usize = 3;

    fn slot(self) -> usize {
        match self {
            Operation::Open => 0,
            Operation::Read => 1,
            Operation::Close => 2,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Open => "open",
            Operation::Read => "read",
            Operation::Close => "close",
        })
    }
}

/// A deterministic fault.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ErrorScenario {
    /// Let `count` calls of `operation` succeed, then fail every later one.
    FailAfterN {
        /// Targeted operation
        operation: Operation,
        /// Calls that succeed first
        count: u32,
    },
    /// Every call of `operation` times out.
    Timeout {
        /// Targeted operation
        operation: Operation,
    },
    /// The link drops at the first checked operation and stays down until
    /// [`ErrorConfig::reset`].
    CommunicationLoss,
}

#[derive(Debug, Default)]
struct FaultState {
    calls: [u32; Operation::COUNT],
    link_down: bool,
}

/// Faults to inject into a mock device.
///
/// Clones share call counters and link state, so a connector and the
/// devices it opens count the same calls.
#[derive(Clone, Debug)]
pub struct ErrorConfig {
    rates: [f64; Operation::COUNT],
    scenarios: Arc<[ErrorScenario]>,
    rng: Arc<MockRng>,
    state: Arc<Mutex<FaultState>>,
}

impl ErrorConfig {
    /// No faults.
    pub fn none() -> Self {
        Self::scenarios(Vec::new())
    }

    /// One deterministic fault.
    pub fn scenario(scenario: ErrorScenario) -> Self {
        Self::scenarios(vec![scenario])
    }

    /// Several deterministic faults, checked in order.
    pub fn scenarios(scenarios: Vec<ErrorScenario>) -> Self {
        Self {
            rates: [0.0; Operation::COUNT],
            scenarios: scenarios.into(),
            rng: Arc::new(MockRng::default()),
            state: Arc::default(),
        }
    }

    /// Fail every operation with probability `rate`. With a seed the failure
    /// pattern is reproducible.
    pub fn random_failures_seeded(rate: f64, seed: Option<u64>) -> Self {
        Self {
            rates: [rate; Operation::COUNT],
            rng: Arc::new(MockRng::new(seed)),
            ..Self::none()
        }
    }

    /// Set the random failure probability of one operation.
    pub fn with_rate(mut self, operation: Operation, rate: f64) -> Self {
        self.rates[operation.slot()] = rate;
        self
    }

    /// Decide whether `operation` fails this time.
    pub fn check(&self, operation: Operation) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        if state.link_down {
            return Err(link_lost());
        }

        let slot = operation.slot();
        state.calls[slot] += 1;
        let calls = state.calls[slot];

        for scenario in self.scenarios.iter() {
            match *scenario {
                ErrorScenario::FailAfterN { operation: target, count }
                    if target == operation && calls > count =>
                {
                    return Err(DriverError::new(
                        DRIVER_TYPE,
                        DriverErrorKind::Hardware,
                        format!("injected {operation} failure after {count} calls"),
                    ));
                }
                ErrorScenario::Timeout { operation: target } if target == operation => {
                    return Err(DriverError::new(
                        DRIVER_TYPE,
                        DriverErrorKind::Timeout,
                        format!("{operation} timed out"),
                    ));
                }
                ErrorScenario::CommunicationLoss => {
                    state.link_down = true;
                    return Err(link_lost());
                }
                _ => {}
            }
        }

        if self.rng.should_fail(self.rates[slot]) {
            return Err(DriverError::new(
                DRIVER_TYPE,
                DriverErrorKind::Hardware,
                format!("random {operation} failure"),
            ));
        }
        Ok(())
    }

    /// Clear call counters and restore the link.
    pub fn reset(&self) {
        *self.state.lock() = FaultState::default();
    }
}

impl Default for ErrorConfig {
    fn default() -> Self {
        Self::none()
    }
}

fn link_lost() -> DriverError {
    DriverError::new(DRIVER_TYPE, DriverErrorKind::Communication, "link to DAQ lost")
}
