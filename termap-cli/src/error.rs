//! CLI error type.

use std::fmt;
use std::io;

use termap::app::AppError;
use termap::config::ConfigError;
use termap::logging::LoggingError;

/// Errors that end the program with a message on stderr.
#[derive(Debug)]
pub enum CliError {
    /// Configuration file or flags were invalid.
    Config(String),

    /// The log file could not be set up.
    Logging(String),

    /// The map session failed to start.
    Session(AppError),

    /// Terminal setup or drawing failed.
    Terminal(io::Error),

    /// The async runtime could not be created.
    Runtime(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Logging(msg) => write!(f, "Failed to set up logging: {}", msg),
            CliError::Session(e) => write!(f, "{}", e),
            CliError::Terminal(e) => write!(f, "Terminal error: {}", e),
            CliError::Runtime(msg) => write!(f, "Failed to create Tokio runtime: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Session(e) => Some(e),
            CliError::Terminal(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e.to_string())
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::Session(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Terminal(e)
    }
}
