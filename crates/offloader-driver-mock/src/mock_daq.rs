//! Mock analog acquisition device and connector.
//!
//! A [`MockConnector`] hands out [`MockHallDevice`]s that serve either a
//! simulated [`MockHallSensor`] or scripted voltage lists. Every device shares
//! the connector's [`ErrorConfig`] and [`MockProbe`], so tests can inject
//! failures and then observe how many times the device was opened, read, and
//! closed.

use offloader_core::capabilities::{AnalogDevice, ChannelId, DeviceConnector};
use offloader_core::error::{DriverError, DriverErrorKind};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::common::{ErrorConfig, Operation};
use crate::hall_sensor::MockHallSensor;

pub(crate) const DRIVER_TYPE: &str = "mock_daq";

// =============================================================================
// MockProbe
// =============================================================================

#[derive(Debug, Default)]
struct ProbeCounters {
    opens: AtomicUsize,
    reads: AtomicUsize,
    closes: AtomicUsize,
}

/// Shared operation counters.
///
/// Clones observe the same counts. Attempts are counted before any injected
/// error is applied.
#[derive(Debug, Clone, Default)]
pub struct MockProbe {
    counters: Arc<ProbeCounters>,
}

impl MockProbe {
    /// Number of `open_any` calls.
    pub fn opens(&self) -> usize {
        self.counters.opens.load(Ordering::SeqCst)
    }

    /// Number of `read_voltage` calls.
    pub fn reads(&self) -> usize {
        self.counters.reads.load(Ordering::SeqCst)
    }

    /// Number of `close` calls.
    pub fn closes(&self) -> usize {
        self.counters.closes.load(Ordering::SeqCst)
    }

    fn record(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Signal sources
// =============================================================================

#[derive(Debug, Clone)]
enum Signal {
    Sensor {
        sensor: Arc<MockHallSensor>,
        channel_a: ChannelId,
        channel_b: ChannelId,
    },
    Scripted(HashMap<ChannelId, Vec<f64>>),
}

#[derive(Debug)]
enum ActiveSignal {
    Sensor {
        sensor: Arc<MockHallSensor>,
        channel_a: ChannelId,
        channel_b: ChannelId,
    },
    Scripted(HashMap<ChannelId, VecDeque<f64>>),
}

impl From<&Signal> for ActiveSignal {
    fn from(signal: &Signal) -> Self {
        match signal {
            Signal::Sensor {
                sensor,
                channel_a,
                channel_b,
            } => ActiveSignal::Sensor {
                sensor: Arc::clone(sensor),
                channel_a: *channel_a,
                channel_b: *channel_b,
            },
            Signal::Scripted(script) => ActiveSignal::Scripted(
                script
                    .iter()
                    .map(|(channel, values)| (*channel, values.iter().copied().collect()))
                    .collect(),
            ),
        }
    }
}

fn unknown_channel(channel: ChannelId) -> DriverError {
    DriverError::new(
        DRIVER_TYPE,
        DriverErrorKind::Configuration,
        format!("Channel {} is not wired on the mock DAQ", channel),
    )
}

// =============================================================================
// MockHallDevice
// =============================================================================

/// An opened mock DAQ.
#[derive(Debug)]
pub struct MockHallDevice {
    signal: ActiveSignal,
    errors: ErrorConfig,
    probe: MockProbe,
    closed: bool,
}

impl MockHallDevice {
    fn next_voltage(&mut self, channel: ChannelId) -> Result<f64, DriverError> {
        match &mut self.signal {
            ActiveSignal::Sensor {
                sensor,
                channel_a,
                channel_b,
            } => {
                if channel == *channel_a {
                    Ok(sensor.read_a())
                } else if channel == *channel_b {
                    Ok(sensor.read_b())
                } else {
                    Err(unknown_channel(channel))
                }
            }
            ActiveSignal::Scripted(script) => script
                .get_mut(&channel)
                .ok_or_else(|| unknown_channel(channel))?
                .pop_front()
                .ok_or_else(|| {
                    DriverError::new(
                        DRIVER_TYPE,
                        DriverErrorKind::Hardware,
                        format!("Script for channel {} is exhausted", channel),
                    )
                }),
        }
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl AnalogDevice for MockHallDevice {
    fn read_voltage(&mut self, channel: ChannelId) -> Result<f64, DriverError> {
        MockProbe::record(&self.probe.counters.reads);
        if self.closed {
            return Err(DriverError::new(
                DRIVER_TYPE,
                DriverErrorKind::Communication,
                "Device is closed",
            ));
        }
        self.errors.check(Operation::Read)?;
        self.next_voltage(channel)
    }

    fn close(&mut self) -> Result<(), DriverError> {
        MockProbe::record(&self.probe.counters.closes);
        self.closed = true;
        debug!("Mock DAQ closed");
        self.errors.check(Operation::Close)
    }

    fn describe(&self) -> String {
        match &self.signal {
            ActiveSignal::Sensor { sensor, .. } => {
                format!("mock Hall sensor (phase {:.4} rad)", sensor.phase())
            }
            ActiveSignal::Scripted(_) => "mock DAQ (scripted)".to_string(),
        }
    }
}

// =============================================================================
// MockConnector
// =============================================================================

/// Opens [`MockHallDevice`]s.
///
/// # Example
///
/// ```
/// use offloader_core::{Calibration, DeviceConnector, AnalogDevice, ChannelId};
/// use offloader_driver_mock::{MockConnector, MockHallSensor};
///
/// let sensor = MockHallSensor::at_position(5.0, &Calibration::default(), 0.5);
/// let connector = MockConnector::sensor(sensor);
/// let mut device = connector.open_any().unwrap();
/// let a = device.read_voltage(ChannelId::new(0)).unwrap();
/// assert!(a > 0.0);
/// device.close().unwrap();
/// assert_eq!(connector.probe().closes(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockConnector {
    signal: Signal,
    errors: ErrorConfig,
    probe: MockProbe,
}

impl MockConnector {
    /// Serve a simulated sensor on `AIN0` (A) and `AIN1` (B).
    pub fn sensor(sensor: MockHallSensor) -> Self {
        Self::from_signal(Signal::Sensor {
            sensor: Arc::new(sensor),
            channel_a: ChannelId::new(0),
            channel_b: ChannelId::new(1),
        })
    }

    /// Replay `a` on `AIN0` and `b` on `AIN1`, one value per read.
    pub fn scripted(a: Vec<f64>, b: Vec<f64>) -> Self {
        Self::scripted_channels([(ChannelId::new(0), a), (ChannelId::new(1), b)])
    }

    /// Replay arbitrary per-channel voltage lists.
    pub fn scripted_channels(script: impl IntoIterator<Item = (ChannelId, Vec<f64>)>) -> Self {
        Self::from_signal(Signal::Scripted(script.into_iter().collect()))
    }

    fn from_signal(signal: Signal) -> Self {
        Self {
            signal,
            errors: ErrorConfig::none(),
            probe: MockProbe::default(),
        }
    }

    /// Wire the simulated sensor's outputs to other channels.
    ///
    /// Has no effect on scripted connectors.
    pub fn with_channels(mut self, a: ChannelId, b: ChannelId) -> Self {
        if let Signal::Sensor {
            channel_a,
            channel_b,
            ..
        } = &mut self.signal
        {
            *channel_a = a;
            *channel_b = b;
        }
        self
    }

    /// Inject failures into open, read, and close.
    pub fn with_errors(mut self, errors: ErrorConfig) -> Self {
        self.errors = errors;
        self
    }

    /// Counters shared with every device this connector opens.
    pub fn probe(&self) -> MockProbe {
        self.probe.clone()
    }
}

impl DeviceConnector for MockConnector {
    type Device = MockHallDevice;

    fn open_any(&self) -> Result<MockHallDevice, DriverError> {
        MockProbe::record(&self.probe.counters.opens);
        self.errors.check(Operation::Open)?;
        debug!("Mock DAQ opened");
        Ok(MockHallDevice {
            signal: ActiveSignal::from(&self.signal),
            errors: self.errors.clone(),
            probe: self.probe.clone(),
            closed: false,
        })
    }
}
