//! Configuration loading using Figment
//!
//! Configuration is layered, later sources overriding earlier ones:
//! 1. Built-in defaults
//! 2. `config/offloader.toml` (or the file given with `--config`)
//! 3. Environment variables prefixed with `OFFLOADER_`, nested with `__`
//! 4. Command-line overrides
//!
//! # Example
//! ```no_run
//! use offloader_daq::config::{AppConfig, Overrides};
//!
//! let config = AppConfig::load(None, &Overrides::default())?;
//! println!("Sampling {} pairs", config.sampling.samples);
//! # Ok::<(), offloader_daq::error::ConfigError>(())
//! ```

use std::path::Path;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use offloader_core::{Calibration, ChannelId, SamplerConfig};
use offloader_driver_mock::MockSensorConfig;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration file read when no `--config` is given. Optional.
pub const DEFAULT_CONFIG_PATH: &str = "config/offloader.toml";

/// Prefix for environment overrides, e.g. `OFFLOADER_SAMPLING__SAMPLES=50`.
pub const ENV_PREFIX: &str = "OFFLOADER_";

/// Accepted values for `application.log_level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application settings
    pub application: ApplicationConfig,
    /// What to sample
    pub sampling: SamplingConfig,
    /// Position decoding constants
    pub calibration: Calibration,
    /// Acquisition hardware
    pub device: DeviceConfig,
    /// Simulated sensor used by the `mock` backend
    pub mock: MockSensorConfig,
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Sampling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Sample pairs per measurement
    pub samples: usize,
    /// Pause between pairs in milliseconds (0 = as fast as possible)
    pub sample_interval_ms: u64,
    /// Hall output A, read first in each pair
    pub channel_a: ChannelId,
    /// Hall output B
    pub channel_b: ChannelId,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        let sampler = SamplerConfig::default();
        Self {
            samples: sampler.samples,
            sample_interval_ms: 0,
            channel_a: sampler.channel_a,
            channel_b: sampler.channel_b,
        }
    }
}

impl SamplingConfig {
    /// Sampler settings for the core engine.
    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            samples: self.samples,
            channel_a: self.channel_a,
            channel_b: self.channel_b,
            interval: Duration::from_millis(self.sample_interval_ms),
        }
    }
}

/// Acquisition backend
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Simulated Hall sensor
    Mock,
    /// Comedi DAQ board
    #[default]
    Comedi,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Mock => write!(f, "mock"),
            Backend::Comedi => write!(f, "comedi"),
        }
    }
}

/// Device configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Backend to acquire from
    pub backend: Backend,
    /// Comedi device node; scans `/dev/comedi0..15` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Comedi range index used for both channels
    pub range_index: u32,
}

/// Command-line overrides, applied after file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--samples`
    pub samples: Option<usize>,
    /// `--backend`
    pub backend: Option<Backend>,
    /// `--device`
    pub device_path: Option<String>,
}

impl AppConfig {
    /// Figment with defaults, the TOML file at `path`, and the environment.
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load, apply overrides, and validate.
    ///
    /// With `path == None` the default file is used if present. An explicit
    /// path must exist.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) if !path.is_file() => {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Some(path) => path,
            None => Path::new(DEFAULT_CONFIG_PATH),
        };

        let mut config: AppConfig = Self::figment(path).extract().map_err(Box::new)?;
        config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides.
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(samples) = overrides.samples {
            self.sampling.samples = samples;
        }
        if let Some(backend) = overrides.backend {
            self.device.backend = backend;
        }
        if let Some(path) = &overrides.device_path {
            self.device.path = Some(path.clone());
        }
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Invalid { message });

        let level = self.application.log_level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return invalid(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                LOG_LEVELS.join(", ")
            ));
        }

        if self.sampling.samples == 0 {
            return invalid("sampling.samples must be at least 1".to_string());
        }

        if self.sampling.channel_a == self.sampling.channel_b {
            return invalid(format!(
                "sampling.channel_a and sampling.channel_b are both {}",
                self.sampling.channel_a
            ));
        }

        let Calibration { k, v0 } = self.calibration;
        if !k.is_finite() || k == 0.0 {
            return invalid(format!("calibration.k must be finite and non-zero, got {k}"));
        }
        if !v0.is_finite() {
            return invalid(format!("calibration.v0 must be finite, got {v0}"));
        }

        if !self.mock.noise.is_finite() || self.mock.noise < 0.0 {
            return invalid(format!(
                "mock.noise must be a non-negative voltage, got {}",
                self.mock.noise
            ));
        }
        if !self.mock.amplitude.is_finite() {
            return invalid(format!(
                "mock.amplitude must be finite, got {}",
                self.mock.amplitude
            ));
        }

        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sampling.samples, 100);
        assert_eq!(config.sampling.channel_a, ChannelId::new(0));
        assert_eq!(config.sampling.channel_b, ChannelId::new(1));
        assert_eq!(config.calibration, Calibration::default());
        assert_eq!(config.device.backend, Backend::Comedi);
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = AppConfig::default();
        config.application.log_level = "verbose".to_string();
        assert!(config.validate().is_err());

        config.application.log_level = "DEBUG".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_samples_rejected() {
        let mut config = AppConfig::default();
        config.apply(&Overrides {
            samples: Some(0),
            ..Default::default()
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("samples"));
    }

    #[test]
    fn test_identical_channels_rejected() {
        let mut config = AppConfig::default();
        config.sampling.channel_b = config.sampling.channel_a;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_calibration_rejected() {
        for (k, v0) in [(0.0, 1.6), (f64::NAN, 1.6), (f64::INFINITY, 1.6), (5.0, f64::NAN)] {
            let mut config = AppConfig::default();
            config.calibration = Calibration::new(k, v0);
            assert!(config.validate().is_err(), "k={k} v0={v0} accepted");
        }
    }

    #[test]
    fn test_negative_noise_rejected() {
        let mut config = AppConfig::default();
        config.mock.noise = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = AppConfig::default();
        config.apply(&Overrides {
            samples: Some(10),
            backend: Some(Backend::Mock),
            device_path: Some("/dev/comedi3".to_string()),
        });
        assert_eq!(config.sampling.samples, 10);
        assert_eq!(config.device.backend, Backend::Mock);
        assert_eq!(config.device.path.as_deref(), Some("/dev/comedi3"));
    }

    #[test]
    fn test_sampler_config_conversion() {
        let sampling = SamplingConfig {
            samples: 7,
            sample_interval_ms: 25,
            channel_a: ChannelId::new(4),
            channel_b: ChannelId::new(5),
        };
        let sampler = sampling.sampler_config();
        assert_eq!(sampler.samples, 7);
        assert_eq!(sampler.interval, Duration::from_millis(25));
        assert_eq!(sampler.channel_b, ChannelId::new(5));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = AppConfig::default();
        config.device.path = Some("/dev/comedi1".to_string());
        config.mock.position_mm = Some(4.5);

        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("channel_a = \"AIN0\""));
        assert!(rendered.contains("backend = \"comedi\""));

        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
