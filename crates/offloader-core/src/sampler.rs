//! Fixed-count polling of the two Hall channels.

use std::thread;
use std::time::Duration;

use tracing::{debug, trace};

use crate::capabilities::{AnalogDevice, ChannelId};
use crate::data::{SampleSequence, SampleSet};
use crate::error::{AcquisitionError, AcquisitionResult};

/// Default number of sample pairs per run.
pub const DEFAULT_SAMPLES: usize = 100;

/// What to sample and how often.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    /// Number of sample pairs to acquire.
    pub samples: usize,
    /// Channel read first in each pair.
    pub channel_a: ChannelId,
    /// Channel read second in each pair.
    pub channel_b: ChannelId,
    /// Pause between pairs. Zero polls as fast as the device answers.
    pub interval: Duration,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            channel_a: ChannelId::new(0),
            channel_b: ChannelId::new(1),
            interval: Duration::ZERO,
        }
    }
}

/// Polls two analog channels a fixed number of times.
///
/// Fail-fast: the first read error aborts the run and the partial sequences
/// are dropped. Reads are never retried.
#[derive(Debug, Clone, Default)]
pub struct Sampler {
    config: SamplerConfig,
}

impl Sampler {
    /// Sampler with the given configuration.
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Acquire `config.samples` pairs from `device`.
    ///
    /// # Errors
    ///
    /// - [`AcquisitionError::InvalidSampleCount`] if the count is zero. No
    ///   read is attempted.
    /// - [`AcquisitionError::DeviceRead`] on the first failed read.
    pub fn sample<D: AnalogDevice + ?Sized>(&self, device: &mut D) -> AcquisitionResult<SampleSet> {
        let SamplerConfig {
            samples: n,
            channel_a,
            channel_b,
            interval,
        } = self.config;

        if n == 0 {
            return Err(AcquisitionError::InvalidSampleCount { count: n });
        }

        debug!(
            samples = n,
            channel_a = %channel_a,
            channel_b = %channel_b,
            interval_ms = interval.as_millis() as u64,
            "Sampling started"
        );

        let mut a = SampleSequence::with_capacity(n);
        let mut b = SampleSequence::with_capacity(n);

        for index in 1..=n {
            let va = read(device, channel_a, index)?;
            let vb = read(device, channel_b, index)?;
            a.push(va);
            b.push(vb);
            trace!(index, a = va, b = vb, "Sample acquired");

            if !interval.is_zero() && index < n {
                thread::sleep(interval);
            }
        }

        debug!(samples = n, "Sampling complete");
        Ok(SampleSet::new(channel_a, channel_b, a, b))
    }
}

/// Acquire `n` pairs from channels `AIN0`/`AIN1` with no inter-sample delay.
pub fn sample<D: AnalogDevice + ?Sized>(device: &mut D, n: usize) -> AcquisitionResult<SampleSet> {
    Sampler::new(SamplerConfig {
        samples: n,
        ..SamplerConfig::default()
    })
    .sample(device)
}

fn read<D: AnalogDevice + ?Sized>(
    device: &mut D,
    channel: ChannelId,
    index: usize,
) -> AcquisitionResult<f64> {
    device
        .read_voltage(channel)
        .map_err(|source| AcquisitionError::DeviceRead {
            channel,
            index,
            source,
        })
}
