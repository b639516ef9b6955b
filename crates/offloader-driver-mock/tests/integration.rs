//! Integration tests for the mock DAQ driving the position engine.

use offloader_core::{
    AcquisitionError, Calibration, ChannelId, EngineState, PositionEngine, SamplerConfig,
};
use offloader_driver_mock::*;

fn config(samples: usize) -> SamplerConfig {
    SamplerConfig {
        samples,
        ..SamplerConfig::default()
    }
}

/// A sensor placed at a position is read back at that position
#[test]
fn test_sensor_position_reproduced_through_engine() {
    let cal = Calibration::default();
    for target in [-8.0, 1.0, 11.0, 19.0] {
        let connector = MockConnector::sensor(MockHallSensor::at_position(target, &cal, 0.5));
        let mut engine = PositionEngine::new(config(20), cal);
        let outcome = engine.run(&connector).unwrap();

        assert!((outcome.result.pos - target).abs() < 1e-9);
        assert_eq!(outcome.result.stdev1, 0.0);
        assert_eq!(outcome.samples, 20);
        assert!(outcome.close_error.is_none());
        assert_eq!(engine.state(), EngineState::Done);
    }
}

/// Noise averages out over the run
#[test]
fn test_noisy_sensor_from_config() {
    let cal = Calibration::default();
    let sensor_config: MockSensorConfig = toml::from_str(
        r#"
        position_mm = 3.0
        amplitude = 0.5
        noise = 0.002
        seed = 42
        "#,
    )
    .unwrap();
    let sensor = MockHallSensor::from_config(&sensor_config, &cal);
    let connector = MockConnector::sensor(sensor);

    let mut engine = PositionEngine::new(config(500), cal);
    let outcome = engine.run(&connector).unwrap();

    assert!((outcome.result.pos - 3.0).abs() < 0.01);
    assert!(outcome.result.stdev1 > 0.0);
    assert!(outcome.result.stdev1 < 0.002);
}

/// 100 identical pairs at (2.0, 2.0)
#[test]
fn test_scripted_identical_pairs() {
    let connector = MockConnector::scripted(vec![2.0; 100], vec![2.0; 100]);
    let mut engine = PositionEngine::new(config(100), Calibration::default());
    let outcome = engine.run(&connector).unwrap();

    assert!((outcome.result.pos - -8.058).abs() < 1e-2);
    assert!((outcome.result.pos_os - 8.058).abs() < 1e-2);
    assert_eq!(outcome.result.stdev2, 0.0);

    let probe = connector.probe();
    assert_eq!(probe.opens(), 1);
    assert_eq!(probe.reads(), 200);
    assert_eq!(probe.closes(), 1);
}

/// A failing read aborts the run but still closes the device once
#[test]
fn test_read_failure_closes_device_once() {
    let errors = ErrorConfig::scenario(ErrorScenario::FailAfterN {
        operation: Operation::Read,
        count: 7,
    });
    let connector = MockConnector::sensor(MockHallSensor::at_phase(0.3, 0.5, 1.6316))
        .with_errors(errors);
    let mut engine = PositionEngine::new(config(10), Calibration::default());

    let err = engine.run(&connector).unwrap_err();
    match err {
        AcquisitionError::DeviceRead { channel, index, .. } => {
            // Eighth read is channel B of the fourth pair
            assert_eq!(channel, ChannelId::new(1));
            assert_eq!(index, 4);
        }
        other => panic!("unexpected error: {other}"),
    }

    let probe = connector.probe();
    assert_eq!(probe.reads(), 8);
    assert_eq!(probe.closes(), 1);
    assert_eq!(engine.state(), EngineState::Failed);
}

/// A close failure is reported but the result survives
#[test]
fn test_close_failure_keeps_result() {
    let errors = ErrorConfig::scenario(ErrorScenario::Timeout {
        operation: Operation::Close,
    });
    let connector = MockConnector::scripted(vec![2.0; 5], vec![2.0; 5]).with_errors(errors);
    let mut engine = PositionEngine::new(config(5), Calibration::default());

    let outcome = engine.run(&connector).unwrap();
    assert!(matches!(
        outcome.close_error,
        Some(AcquisitionError::DeviceClose { .. })
    ));
    assert!((outcome.result.pos - -8.058).abs() < 1e-2);
    assert_eq!(connector.probe().closes(), 1);
}

/// Open failure never reaches a read or a close
#[test]
fn test_open_failure_is_fatal() {
    let connector = MockConnector::scripted(vec![2.0], vec![2.0])
        .with_errors(ErrorConfig::scenario(ErrorScenario::CommunicationLoss));
    let mut engine = PositionEngine::new(config(1), Calibration::default());

    let err = engine.run(&connector).unwrap_err();
    assert!(matches!(err, AcquisitionError::DeviceOpen { .. }));
    let probe = connector.probe();
    assert_eq!(probe.reads(), 0);
    assert_eq!(probe.closes(), 0);
}

/// Seeded random failures repeat exactly
#[test]
fn test_random_errors_with_seed() {
    let outcome = |seed| {
        let connector = MockConnector::scripted(vec![2.0; 50], vec![2.0; 50])
            .with_errors(ErrorConfig::random_failures_seeded(0.05, Some(seed)));
        let mut engine = PositionEngine::new(config(50), Calibration::default());
        let result = engine.run(&connector).map(|o| o.result.pos).map_err(|e| e.to_string());
        (result, connector.probe().reads())
    };

    assert_eq!(outcome(12345), outcome(12345));
}
