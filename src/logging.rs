//! Tracing setup for the `offloader-daq` binary.
//!
//! Logs go to stderr so that stdout carries only the report. `RUST_LOG`, when
//! set, replaces the configured `application.log_level` filter.
//!
//! ```no_run
//! use offloader_daq::config::{AppConfig, Overrides};
//! use offloader_daq::logging::{self, LogFormat};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load(None, &Overrides::default())?;
//! logging::init_from_config(&config, LogFormat::Json)?;
//! tracing::info!("ready");
//! # Ok(())
//! # }
//! ```

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::config::AppConfig;
use crate::error::ConfigError;

/// Log line layout, selected with `--log-format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Multi-line, colored
    Pretty,
    /// One line per event
    #[default]
    Compact,
    /// Newline-delimited JSON objects
    Json,
}

/// Subscriber settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    /// Default filter level when `RUST_LOG` is unset
    pub level: Level,
    /// Line layout
    pub format: LogFormat,
    /// Emit an event when the `position_run` span opens and closes
    pub span_events: bool,
    /// Colors for the pretty layout
    pub ansi: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Compact,
            span_events: false,
            ansi: true,
        }
    }
}

impl LogSettings {
    /// Settings at the configured `application.log_level`.
    pub fn for_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            level: parse_level(&config.application.log_level)?,
            ..Self::default()
        })
    }

    /// Use `format`.
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Toggle span open/close events.
    pub fn span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_str().to_ascii_lowercase()))
    }
}

/// Parse `trace`..`error`, case-insensitively.
pub fn parse_level(level: &str) -> Result<Level, ConfigError> {
    Level::from_str(level.trim()).map_err(|_| ConfigError::Invalid {
        message: format!("unknown log level '{level}'"),
    })
}

/// Install the global subscriber for `config` in the given layout.
pub fn init_from_config(config: &AppConfig, format: LogFormat) -> Result<(), ConfigError> {
    init(&LogSettings::for_config(config)?.format(format))
}

/// Install the global subscriber.
///
/// Calling this again once a subscriber is installed is a no-op.
pub fn init(settings: &LogSettings) -> Result<(), ConfigError> {
    let spans = if settings.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_span_events(spans)
        .with_target(false);
    let filter = settings.filter();

    match settings.format {
        LogFormat::Pretty => install(layer.pretty().with_ansi(settings.ansi).with_filter(filter)),
        LogFormat::Compact => install(layer.compact().with_ansi(false).with_filter(filter)),
        LogFormat::Json => install(layer.json().with_filter(filter)),
    }
}

fn install<L>(layer: L) -> Result<(), ConfigError>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    match tracing_subscriber::registry().with(layer).try_init() {
        Ok(()) => Ok(()),
        // Tests and repeated calls find a dispatcher already installed
        Err(err) if err.to_string().contains("already been set") => Ok(()),
        Err(err) => Err(ConfigError::Invalid {
            message: format!("cannot install log subscriber: {err}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_parse_like_config_validation() {
        for (name, level) in [
            ("trace", Level::TRACE),
            ("DEBUG", Level::DEBUG),
            ("Info", Level::INFO),
            (" warn ", Level::WARN),
            ("error", Level::ERROR),
        ] {
            assert_eq!(parse_level(name).unwrap(), level);
        }
        assert!(matches!(
            parse_level("verbose"),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_settings_follow_config() {
        let mut config = AppConfig::default();
        config.application.log_level = "warn".to_string();

        let settings = LogSettings::for_config(&config).unwrap().format(LogFormat::Json);
        assert_eq!(settings.level, Level::WARN);
        assert_eq!(settings.format, LogFormat::Json);
        assert!(!settings.span_events);
    }

    #[test]
    fn test_repeated_init_is_ok() {
        let settings = LogSettings {
            level: Level::ERROR,
            ..LogSettings::default()
        }
        .span_events(true);
        assert!(init(&settings).is_ok());
        assert!(init(&settings).is_ok());
    }
}
