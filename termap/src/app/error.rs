//! Application error types.

use std::fmt;

use crate::config::ConfigError;
use crate::provider::ProviderError;

/// Errors that can occur while starting a session.
#[derive(Debug)]
pub enum AppError {
    /// The configuration failed validation.
    Config(ConfigError),

    /// The tile transport could not be created.
    Provider(ProviderError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::Provider(e) => write!(f, "Failed to create tile source: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(e) => Some(e),
            AppError::Provider(e) => Some(e),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}

impl From<ProviderError> for AppError {
    fn from(e: ProviderError) -> Self {
        AppError::Provider(e)
    }
}
