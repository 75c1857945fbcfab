//! Diagnostic logging for the console.
//!
//! Plain `LEVEL message` lines on stderr, so they never mix with what the engine prints.

use std::str::FromStr;
use tracing_subscriber::{
    Layer, Registry, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl LogLevel {
    /// Level for the command line: an explicit `--log-level` wins, otherwise `--verbose`
    /// selects debug and the default is warn.
    pub fn for_cli(verbose: bool, explicit: Option<LogLevel>) -> Self {
        match explicit {
            Some(level) => level,
            None if verbose => LogLevel::Debug,
            None => LogLevel::default(),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!(
                "unknown log level '{other}': expected trace, debug, info, warn or error"
            )),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Install the global subscriber. Calling it again after a subscriber is set is a no-op.
pub fn init(level: LogLevel) {
    let filter = LevelFilter::from_level(level.into());

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_level(true)
        .with_ansi(false)
        .compact()
        .with_filter(filter);

    let _ = Registry::default().with(layer).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_level_selection() {
        assert_eq!(LogLevel::for_cli(false, None), LogLevel::Warn);
        assert_eq!(LogLevel::for_cli(true, None), LogLevel::Debug);
        assert_eq!(LogLevel::for_cli(true, Some(LogLevel::Trace)), LogLevel::Trace);
        assert_eq!(LogLevel::for_cli(false, Some(LogLevel::Info)), LogLevel::Info);
        assert_eq!(tracing::Level::from(LogLevel::default()), tracing::Level::WARN);
    }

    #[test]
    fn test_parse_level_names() {
        assert_eq!("info".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("TRACE".parse::<LogLevel>(), Ok(LogLevel::Trace));
        assert!("loud".parse::<LogLevel>().unwrap_err().contains("'loud'"));
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init(LogLevel::Debug);
        init(LogLevel::Error);
        tracing::debug!("logging initialised");
    }
}
