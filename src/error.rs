//! Unified error handling for gtappl
//!
//! Construction paths (thread/process/program discovery, settings loading)
//! return `FreezeResult`. Suspend/resume never error: they report a bool.

use std::fmt;
use std::io;
use thiserror::Error;

/// Which kind of native object an identifier refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Thread,
    Process,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdKind::Thread => f.write_str("thread"),
            IdKind::Process => f.write_str("process"),
        }
    }
}

/// Main error type for the application
#[derive(Error, Debug)]
pub enum FreezeError {
    /// A negative (or out of range) native identifier reached a constructor
    #[error("Invalid {kind} identifier: {value}")]
    InvalidIdentifier { kind: IdKind, value: i64 },

    /// The application name matched no running process
    #[error("No running process matches '{name}'")]
    NoMatchingProcess { name: String },

    /// Listing processes or threads failed
    #[error("Enumeration error ({target}): {message}")]
    Enumeration {
        message: String,
        target: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No native suspension backend on this OS
    #[error("Platform error: {message}")]
    Platform { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Filesystem errors
    #[error("Filesystem error: {message} (path: {path})")]
    Filesystem {
        message: String,
        path: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl FreezeError {
    /// Get error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            FreezeError::InvalidIdentifier { .. } => ErrorCategory::Validation,
            FreezeError::NoMatchingProcess { .. } => ErrorCategory::Discovery,
            FreezeError::Enumeration { .. } => ErrorCategory::Discovery,
            FreezeError::Platform { .. } => ErrorCategory::Platform,
            FreezeError::Config { .. } => ErrorCategory::Config,
            FreezeError::Filesystem { .. } => ErrorCategory::Filesystem,
        }
    }

    /// Check if error is recoverable (e.g. retry once the game is started)
    pub fn is_recoverable(&self) -> bool {
        match self {
            FreezeError::InvalidIdentifier { .. } => false,
            FreezeError::NoMatchingProcess { .. } => true,
            FreezeError::Enumeration { .. } => true,
            FreezeError::Platform { .. } => false,
            FreezeError::Config { .. } => false,
            FreezeError::Filesystem { .. } => false,
        }
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            FreezeError::InvalidIdentifier { kind, value } => {
                format!("The OS reported an invalid {} id ({})", kind, value)
            }
            FreezeError::NoMatchingProcess { name } => {
                format!("failed to load {}: is it running?", name)
            }
            FreezeError::Enumeration { message, .. } => {
                format!("Unable to scan processes: {}", message)
            }
            FreezeError::Platform { message } => {
                format!("Unsupported system: {}", message)
            }
            FreezeError::Config { message, .. } => {
                format!("Configuration problem: {}", message)
            }
            FreezeError::Filesystem { message, .. } => {
                format!("File system problem: {}", message)
            }
        }
    }

    /// Get technical details for logging
    pub fn technical_details(&self) -> String {
        match self {
            FreezeError::Enumeration { target, source, .. } => {
                let mut details = format!("Enumeration error - Target: {}", target);
                if let Some(src) = source {
                    details.push_str(&format!(", Source: {}", src));
                }
                details
            }
            FreezeError::Config { source, .. } => {
                if let Some(src) = source {
                    format!("Config error - Source: {}", src)
                } else {
                    "Config error - No source".to_string()
                }
            }
            _ => format!("Error details: {}", self),
        }
    }
}

impl From<io::Error> for FreezeError {
    fn from(err: io::Error) -> Self {
        FreezeError::Filesystem {
            message: format!("I/O error: {err}"),
            path: "<io>".to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// Error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Discovery,
    Platform,
    Config,
    Filesystem,
}

impl ErrorCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "Validation",
            ErrorCategory::Discovery => "Discovery",
            ErrorCategory::Platform => "Platform",
            ErrorCategory::Config => "Configuration",
            ErrorCategory::Filesystem => "Filesystem",
        }
    }
}

/// Result type alias for convenience
pub type FreezeResult<T> = Result<T, FreezeError>;

/// Helpers for building errors with context
pub mod errors {
    use super::*;

    pub fn config_error(message: impl Into<String>) -> FreezeError {
        FreezeError::Config {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> FreezeError {
        FreezeError::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn filesystem_error(
        message: impl Into<String>,
        path: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> FreezeError {
        FreezeError::Filesystem {
            message: message.into(),
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categorization() {
        let err = FreezeError::InvalidIdentifier {
            kind: IdKind::Thread,
            value: -1,
        };
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(!err.is_recoverable());

        let err = FreezeError::NoMatchingProcess {
            name: "GTA".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Discovery);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_user_messages() {
        let err = FreezeError::NoMatchingProcess {
            name: "GTA".to_string(),
        };
        assert_eq!(err.user_message(), "failed to load GTA: is it running?");

        let err = FreezeError::InvalidIdentifier {
            kind: IdKind::Process,
            value: -7,
        };
        assert!(err.to_string().contains("process identifier: -7"));
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err: FreezeError = io_err.into();
        assert_eq!(err.category(), ErrorCategory::Filesystem);
    }
}
