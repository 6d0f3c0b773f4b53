//! Logging setup on top of the tracing ecosystem
//!
//! Library crates only emit `tracing` events; binaries call
//! [`init_logging`] once to install a subscriber.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Verbosity levels exposed to the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Debug = 10,
    Info = 20,
    Warning = 30,
    Error = 40,
}

impl LogLevel {
    /// Map `-v` repetitions and `--quiet` onto a level.
    ///
    /// Quiet wins over any verbosity count.
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return LogLevel::Error;
        }
        match verbose {
            0 => LogLevel::Warning,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warning => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        };
        write!(f, "{}", name)
    }
}

/// Subscriber configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub include_location: bool,
    pub include_thread_id: bool,
    pub colored_output: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warning,
            include_location: false,
            include_thread_id: false,
            colored_output: true,
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides `config.level`.
///
/// Logs go to stderr so that stdout stays clean for reports and prompts.
pub fn init_logging(config: LoggerConfig) -> crate::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::from(config.level).into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(config.include_thread_id)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_ansi(config.colored_output);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| crate::UtilError::Config(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}

/// Initialize logging at the given level with default formatting
pub fn basic_config(level: Option<LogLevel>) -> crate::Result<()> {
    let config = LoggerConfig {
        level: level.unwrap_or(LogLevel::Warning),
        ..Default::default()
    };
    init_logging(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_levels() {
        assert!(LogLevel::Error > LogLevel::Warning);
        assert!(LogLevel::Warning > LogLevel::Info);
        assert!(LogLevel::Info > LogLevel::Debug);
        assert!(LogLevel::Debug > LogLevel::Trace);
    }

    #[test]
    fn test_from_verbosity() {
        assert_eq!(LogLevel::from_verbosity(0, false), LogLevel::Warning);
        assert_eq!(LogLevel::from_verbosity(1, false), LogLevel::Info);
        assert_eq!(LogLevel::from_verbosity(2, false), LogLevel::Debug);
        assert_eq!(LogLevel::from_verbosity(7, false), LogLevel::Trace);
        assert_eq!(LogLevel::from_verbosity(3, true), LogLevel::Error);
    }

    #[test]
    fn test_level_conversion() {
        assert_eq!(Level::from(LogLevel::Warning), Level::WARN);
        assert_eq!(LogLevel::Info.to_string(), "INFO");
    }

    #[test]
    fn test_second_init_fails() {
        // Whichever call wins the race, a second install must report an error.
        let _ = basic_config(Some(LogLevel::Error));
        assert!(basic_config(Some(LogLevel::Error)).is_err());
    }
}
