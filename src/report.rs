//! Measurement report rendering.

use std::fmt;

use offloader_core::{Calibration, ChannelId, RunOutcome};
use serde::Serialize;

use crate::config::Backend;
use crate::error::AppError;

/// Output format for `measure`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    /// Human-readable block
    #[default]
    Text,
    /// Single JSON object
    Json,
}

/// Mean and sample standard deviation of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelReading {
    /// Channel sampled
    pub channel: ChannelId,
    /// Mean voltage (V)
    pub mean: f64,
    /// Sample standard deviation (V)
    pub stdev: f64,
}

/// One completed measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Backend the samples came from
    pub backend: Backend,
    /// Device path, when one was configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Sample pairs averaged
    pub samples: usize,
    /// Calibration used
    pub calibration: Calibration,
    /// Channel A statistics (V1)
    pub v1: ChannelReading,
    /// Channel B statistics (V2)
    pub v2: ChannelReading,
    /// Offloader/snubber position (mm)
    pub pos: f64,
    /// Output-shaft position (mm)
    pub pos_os: f64,
    /// Close failure after sampling; the position is still valid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_error: Option<String>,
}

impl Report {
    /// Build from an engine run.
    pub fn new(backend: Backend, device: Option<String>, outcome: &RunOutcome) -> Self {
        let result = &outcome.result;
        Self {
            backend,
            device,
            samples: outcome.samples,
            calibration: outcome.calibration,
            v1: ChannelReading {
                channel: outcome.channel_a,
                mean: result.v1,
                stdev: result.stdev1,
            },
            v2: ChannelReading {
                channel: outcome.channel_b,
                mean: result.v2,
                stdev: result.stdev2,
            },
            pos: result.pos,
            pos_os: result.pos_os,
            close_error: outcome.close_error.as_ref().map(ToString::to_string),
        }
    }

    /// Render in the requested format.
    pub fn render(&self, format: ReportFormat) -> Result<String, AppError> {
        match format {
            ReportFormat::Text => Ok(self.to_string()),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.device {
            Some(device) => writeln!(f, "Backend:  {} ({device})", self.backend)?,
            None => writeln!(f, "Backend:  {}", self.backend)?,
        }
        writeln!(f, "V_0:      {:.4} V", self.calibration.v0)?;
        writeln!(f, "k:        {:.4} mm/rad", self.calibration.k)?;
        writeln!(f, "n:        {}", self.samples)?;
        writeln!(
            f,
            "V1 ({}): {:.4} V  (stdev {:.5} V)",
            self.v1.channel, self.v1.mean, self.v1.stdev
        )?;
        writeln!(
            f,
            "V2 ({}): {:.4} V  (stdev {:.5} V)",
            self.v2.channel, self.v2.mean, self.v2.stdev
        )?;
        writeln!(f, "POS:      {:.3} mm", self.pos)?;
        write!(f, "POS_os:   {:.3} mm", self.pos_os)?;
        if let Some(err) = &self.close_error {
            write!(f, "\nwarning:  device close failed: {err}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use offloader_core::PositionResult;

    fn outcome() -> RunOutcome {
        RunOutcome {
            result: PositionResult {
                pos: 3.25,
                pos_os: 19.36,
                v1: 2.1,
                v2: 1.9,
                stdev1: 0.001,
                stdev2: 0.002,
            },
            calibration: Calibration::default(),
            samples: 100,
            channel_a: ChannelId::new(0),
            channel_b: ChannelId::new(1),
            close_error: None,
        }
    }

    #[test]
    fn test_text_report() {
        let report = Report::new(Backend::Mock, None, &outcome());
        let text = report.render(ReportFormat::Text).unwrap();

        assert!(text.starts_with("Backend:  mock\n"));
        assert!(text.contains("V_0:      1.6316 V"));
        assert!(text.contains("n:        100"));
        assert!(text.contains("V1 (AIN0): 2.1000 V"));
        assert!(text.contains("V2 (AIN1): 1.9000 V"));
        assert!(text.contains("POS:      3.250 mm"));
        assert!(text.ends_with("POS_os:   19.360 mm"));
    }

    #[test]
    fn test_json_report() {
        let report = Report::new(Backend::Comedi, Some("/dev/comedi0".to_string()), &outcome());
        let json = report.render(ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["backend"], "comedi");
        assert_eq!(value["device"], "/dev/comedi0");
        assert_eq!(value["samples"], 100);
        assert_eq!(value["v1"]["channel"], "AIN0");
        assert_eq!(value["pos"], 3.25);
        assert!(value.get("close_error").is_none());
    }

    #[test]
    fn test_close_error_is_reported() {
        use offloader_core::{AcquisitionError, DriverError, DriverErrorKind};

        let mut outcome = outcome();
        outcome.close_error = Some(AcquisitionError::DeviceClose {
            source: DriverError::new("mock_daq", DriverErrorKind::Timeout, "close hung"),
        });
        let report = Report::new(Backend::Mock, None, &outcome);

        assert!(report.close_error.as_deref().unwrap().contains("close hung"));
        assert!(report.to_string().contains("device close failed"));
    }
}
