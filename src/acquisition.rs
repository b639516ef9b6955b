//! One measurement, from configuration to report.
//!
//! Picks the device connector for the configured backend, runs the
//! [`PositionEngine`] once, and turns the outcome into a [`Report`].

use offloader_core::{DeviceConnector, PositionEngine};
use offloader_driver_mock::{MockConnector, MockHallSensor};
use tracing::{info, warn};

use crate::config::{AppConfig, Backend};
use crate::error::AppError;
use crate::report::Report;

/// Acquire once with the configured backend.
///
/// # Errors
///
/// [`AppError::BackendUnavailable`] if the backend is not compiled in, or
/// [`AppError::Acquisition`] if opening, sampling, or estimating failed. A
/// failed close is logged and carried in [`Report::close_error`].
pub fn measure(config: &AppConfig) -> Result<Report, AppError> {
    info!(
        backend = %config.device.backend,
        samples = config.sampling.samples,
        "Starting measurement"
    );

    match config.device.backend {
        Backend::Mock => run(config, &mock_connector(config)),
        Backend::Comedi => measure_comedi(config),
    }
}

/// Connector simulating the configured mock sensor on the sampled channels.
pub fn mock_connector(config: &AppConfig) -> MockConnector {
    let sensor = MockHallSensor::from_config(&config.mock, &config.calibration);
    MockConnector::sensor(sensor)
        .with_channels(config.sampling.channel_a, config.sampling.channel_b)
}

#[cfg(feature = "comedi")]
fn measure_comedi(config: &AppConfig) -> Result<Report, AppError> {
    use offloader_driver_comedi::ComediConnector;

    let mut connector = ComediConnector::new().with_range_index(config.device.range_index);
    if let Some(path) = &config.device.path {
        connector = connector.with_path(path.clone());
    }
    run(config, &connector)
}

#[cfg(not(feature = "comedi"))]
fn measure_comedi(_config: &AppConfig) -> Result<Report, AppError> {
    Err(AppError::BackendUnavailable {
        backend: Backend::Comedi,
    })
}

fn run<C: DeviceConnector>(config: &AppConfig, connector: &C) -> Result<Report, AppError> {
    let mut engine = PositionEngine::new(config.sampling.sampler_config(), config.calibration);
    let outcome = engine.run(connector)?;

    if let Some(err) = &outcome.close_error {
        warn!(error = %err, "Device close failed after sampling");
    }

    let device = match config.device.backend {
        Backend::Comedi => config.device.path.clone(),
        Backend::Mock => None,
    };
    Ok(Report::new(config.device.backend, device, &outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Overrides;

    fn mock_config(position_mm: f64) -> AppConfig {
        let mut config = AppConfig::default();
        config.apply(&Overrides {
            samples: Some(20),
            backend: Some(Backend::Mock),
            device_path: None,
        });
        config.mock.position_mm = Some(position_mm);
        config
    }

    #[test]
    fn test_mock_measurement() {
        let report = measure(&mock_config(6.0)).unwrap();

        assert_eq!(report.backend, Backend::Mock);
        assert_eq!(report.samples, 20);
        assert!((report.pos - 6.0).abs() < 1e-9, "pos = {}", report.pos);
        assert!(report.v1.stdev < 1e-12);
        assert!(report.device.is_none());
        assert!(report.close_error.is_none());
    }

    #[test]
    fn test_mock_uses_configured_channels() {
        use offloader_core::ChannelId;

        let mut config = mock_config(1.0);
        config.sampling.channel_a = ChannelId::new(2);
        config.sampling.channel_b = ChannelId::new(3);

        let report = measure(&config).unwrap();
        assert_eq!(report.v1.channel, ChannelId::new(2));
        assert_eq!(report.v2.channel, ChannelId::new(3));
        assert!((report.pos - 1.0).abs() < 1e-9);
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_measurement_is_logged() {
        measure(&mock_config(0.5)).unwrap();
        assert!(logs_contain("Starting measurement"));
        assert!(logs_contain("backend=mock"));
    }

    #[cfg(not(feature = "comedi_hardware"))]
    #[test]
    fn test_comedi_without_hardware_fails() {
        let mut config = AppConfig::default();
        config.device.backend = Backend::Comedi;
        assert!(measure(&config).is_err());
    }
}
