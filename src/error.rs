//! Error types for driving the engine

use thiserror::Error;

use crate::codes::ErrorCode;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Settings rejected before any native call is made
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No output device was selected
    #[error("an output device must be defined")]
    MissingDevice,

    /// A page range that does not start at a positive page
    #[error("page range must start at page 1 or later (got {start})")]
    InvalidPageRange { start: u32 },

    /// Resolution is empty (0x0)
    #[error("an output resolution must be defined")]
    MissingResolution,

    /// Neither a named paper size nor manual dimensions were given
    #[error("a page size must be defined")]
    MissingPageSize,
}

/// Errors that can occur while converting documents
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid conversion settings
    #[error("Invalid conversion settings: {0}")]
    Validation(#[from] ValidationError),

    /// The engine refused to create an instance
    #[error("Engine instance creation failed: {0}")]
    InstanceCreation(ErrorCode),

    /// Binding the stdio callbacks failed
    #[error("Binding engine stdio failed: {0}")]
    StdioBinding(ErrorCode),

    /// The engine reported a failure while running
    #[error("Ghostscript conversion error: {0}")]
    Engine(ErrorCode),

    /// Revision information could not be read
    #[error("Reading engine revision failed: {0}")]
    Revision(ErrorCode),

    /// An argument could not be passed to the engine (interior NUL byte)
    #[error("Invalid engine argument: {0}")]
    InvalidArgument(String),

    /// Another handle to the process-wide engine is still alive
    #[error("The native engine is already claimed by another manager")]
    EngineInUse,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// The categorized native code behind this error, if it came from the engine
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Error::InstanceCreation(c) | Error::StdioBinding(c) | Error::Engine(c) | Error::Revision(c) => {
                Some(*c)
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_expose_their_code() {
        let err = Error::Engine(ErrorCode::from_raw(-25));
        assert_eq!(err.code(), Some(ErrorCode::VmError));
        assert!(err.to_string().contains("VM error"));

        let err: Error = ValidationError::MissingDevice.into();
        assert_eq!(err.code(), None);
    }
}
