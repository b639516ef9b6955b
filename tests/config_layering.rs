//! Configuration precedence: defaults < file < environment < CLI.
//!
//! Tests that touch `OFFLOADER_*` variables run serially.

use offloader_core::{Calibration, ChannelId};
use offloader_daq::config::{AppConfig, Backend, Overrides};
use offloader_daq::error::ConfigError;
use serial_test::serial;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SAMPLE_FILE: &str = r#"
[application]
log_level = "debug"

[sampling]
samples = 250
channel_a = "AIN2"
channel_b = "ain3"

[calibration]
v0 = 1.5

[device]
backend = "mock"

[mock]
position_mm = 3.0
"#;

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("offloader.toml");
    fs::write(&path, contents).unwrap();
    path
}

struct EnvGuard(&'static [&'static str]);

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in self.0 {
            std::env::remove_var(key);
        }
    }
}

#[test]
#[serial]
fn test_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, SAMPLE_FILE);

    let config = AppConfig::load(Some(&path), &Overrides::default()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.sampling.samples, 250);
    assert_eq!(config.sampling.channel_a, ChannelId::new(2));
    assert_eq!(config.sampling.channel_b, ChannelId::new(3));
    assert_eq!(config.sampling.sample_interval_ms, 0);
    assert_eq!(config.calibration.v0, 1.5);
    assert_eq!(config.calibration.k, Calibration::default().k);
    assert_eq!(config.device.backend, Backend::Mock);
    assert_eq!(config.mock.position_mm, Some(3.0));
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    let _guard = EnvGuard(&["OFFLOADER_SAMPLING__SAMPLES", "OFFLOADER_CALIBRATION__K"]);
    std::env::set_var("OFFLOADER_SAMPLING__SAMPLES", "40");
    std::env::set_var("OFFLOADER_CALIBRATION__K", "4.0");

    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, SAMPLE_FILE);
    let config = AppConfig::load(Some(&path), &Overrides::default()).unwrap();

    assert_eq!(config.sampling.samples, 40);
    assert_eq!(config.calibration.k, 4.0);
    assert_eq!(config.calibration.v0, 1.5);
}

#[test]
#[serial]
fn test_cli_overrides_environment() {
    let _guard = EnvGuard(&["OFFLOADER_SAMPLING__SAMPLES", "OFFLOADER_DEVICE__BACKEND"]);
    std::env::set_var("OFFLOADER_SAMPLING__SAMPLES", "40");
    std::env::set_var("OFFLOADER_DEVICE__BACKEND", "mock");

    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");
    let overrides = Overrides {
        samples: Some(7),
        backend: Some(Backend::Comedi),
        device_path: Some("/dev/comedi2".to_string()),
    };
    let config = AppConfig::load(Some(&path), &overrides).unwrap();

    assert_eq!(config.sampling.samples, 7);
    assert_eq!(config.device.backend, Backend::Comedi);
    assert_eq!(config.device.path.as_deref(), Some("/dev/comedi2"));
}

#[test]
#[serial]
fn test_missing_explicit_file_is_an_error() {
    let err = AppConfig::load(Some(Path::new("/nonexistent/offloader.toml")), &Overrides::default())
        .unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }));
}

#[test]
#[serial]
fn test_invalid_values_are_rejected() {
    let dir = TempDir::new().unwrap();

    let path = write_config(&dir, "[sampling]\nsamples = 0\n");
    let err = AppConfig::load(Some(&path), &Overrides::default()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));

    let path = write_config(&dir, "[sampling]\nchannel_a = \"AIN1\"\n");
    let err = AppConfig::load(Some(&path), &Overrides::default()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));

    let path = write_config(&dir, "[device]\nbackend = \"labjack\"\n");
    let err = AppConfig::load(Some(&path), &Overrides::default()).unwrap_err();
    assert!(matches!(err, ConfigError::Extract(_)));

    let path = write_config(&dir, "[sampling]\nchannel_a = \"X9\"\n");
    let err = AppConfig::load(Some(&path), &Overrides::default()).unwrap_err();
    assert!(matches!(err, ConfigError::Extract(_)));
}

#[test]
#[serial]
fn test_rendered_config_loads_back() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, SAMPLE_FILE);
    let config = AppConfig::load(Some(&path), &Overrides::default()).unwrap();

    let rendered = config.to_toml().unwrap();
    let path = write_config(&dir, &rendered);
    let reloaded = AppConfig::load(Some(&path), &Overrides::default()).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
#[serial]
fn test_shipped_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/offloader.toml");
    let config = AppConfig::load(Some(&path), &Overrides::default()).unwrap();
    assert_eq!(config.calibration, Calibration::default());
    assert_eq!(config.device.backend, Backend::Comedi);
}
