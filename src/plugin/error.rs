//! Plugin Error Types
//!
//! Error handling for plugin loading and plugin configuration.

use thiserror::Error;

/// Result type for plugin operations
pub type PluginResult<T> = Result<T, PluginError>;

/// Error types for plugin operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    /// The dynamic loader could not load the named library
    #[error("Error opening '{path}': {message}")]
    LoadFailed { path: String, message: String },

    /// Configuration error
    #[error("Plugin configuration error: {message}")]
    ConfigurationError { message: String },
}

impl PluginError {
    /// Create a load failure for a library path
    pub fn load_failed<P: Into<String>, S: Into<String>>(path: P, message: S) -> Self {
        Self::LoadFailed { path: path.into(), message: message.into() }
    }

    /// Create a configuration error
    pub fn configuration_error<S: Into<String>>(message: S) -> Self {
        Self::ConfigurationError { message: message.into() }
    }

    /// Loader or configuration message without the path prefix
    pub fn message(&self) -> &str {
        match self {
            PluginError::LoadFailed { message, .. } => message,
            PluginError::ConfigurationError { message } => message,
        }
    }
}
