//! Sample containers and their summary statistics.

use serde::Serialize;

use crate::capabilities::ChannelId;

/// Voltages acquired from one channel, in acquisition order.
///
/// Only the [`Sampler`](crate::sampler::Sampler) appends to a sequence; once
/// handed out it is read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SampleSequence {
    values: Vec<f64>,
}

impl SampleSequence {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if no samples were acquired.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Samples as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over samples in acquisition order.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Arithmetic mean, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    /// Sample standard deviation (N-1 denominator), `None` when empty.
    ///
    /// A single sample has no spread and yields `0.0`.
    pub fn std_dev(&self) -> Option<f64> {
        let mean = self.mean()?;
        let n = self.values.len();
        if n == 1 {
            return Some(0.0);
        }
        let sum_sq: f64 = self.values.iter().map(|v| (v - mean).powi(2)).sum();
        Some((sum_sq / (n - 1) as f64).sqrt())
    }
}

impl From<Vec<f64>> for SampleSequence {
    fn from(values: Vec<f64>) -> Self {
        Self { values }
    }
}

/// One near-simultaneous reading of both channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplePair {
    /// 1-based acquisition index.
    pub index: usize,
    /// Channel A voltage.
    pub a: f64,
    /// Channel B voltage.
    pub b: f64,
}

/// Both channel sequences from one completed sampling run.
///
/// The two sequences always have the same length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSet {
    channel_a: ChannelId,
    channel_b: ChannelId,
    a: SampleSequence,
    b: SampleSequence,
}

impl SampleSet {
    pub(crate) fn new(
        channel_a: ChannelId,
        channel_b: ChannelId,
        a: SampleSequence,
        b: SampleSequence,
    ) -> Self {
        debug_assert_eq!(a.len(), b.len());
        Self {
            channel_a,
            channel_b,
            a,
            b,
        }
    }

    /// Channel sampled into sequence A.
    pub fn channel_a(&self) -> ChannelId {
        self.channel_a
    }

    /// Channel sampled into sequence B.
    pub fn channel_b(&self) -> ChannelId {
        self.channel_b
    }

    /// Sequence A.
    pub fn a(&self) -> &SampleSequence {
        &self.a
    }

    /// Sequence B.
    pub fn b(&self) -> &SampleSequence {
        &self.b
    }

    /// Number of sample pairs.
    pub fn len(&self) -> usize {
        self.a.len()
    }

    /// True if no pairs were acquired.
    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    /// Iterate over pairs in acquisition order.
    pub fn pairs(&self) -> impl Iterator<Item = SamplePair> + '_ {
        self.a
            .iter()
            .zip(self.b.iter())
            .enumerate()
            .map(|(i, (a, b))| SamplePair { index: i + 1, a, b })
    }

    /// Split into the two sequences.
    pub fn into_sequences(self) -> (SampleSequence, SampleSequence) {
        (self.a, self.b)
    }
}
