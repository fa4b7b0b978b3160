//! Error types for frostlock.
//!
//! Every error in this enum is a startup or environment failure: the lock
//! session refuses to start rather than lock only some monitors.
//! Authentication failures are recoverable and live in [`crate::auth::AuthError`].

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for frostlock operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Output Errors ===
    /// The compositor output query could not be run or exited unsuccessfully.
    #[error("failed to query outputs with '{command}': {message}")]
    OutputQuery {
        /// The command that was run.
        command: String,
        /// Description of what went wrong.
        message: String,
    },

    /// The compositor reported no outputs to lock.
    #[error("compositor reported no active outputs")]
    NoOutputs,

    // === Capture Errors ===
    /// The screenshot tool failed for an output.
    #[error("failed to capture output '{output}': {message}")]
    CaptureFailed {
        /// Name of the output.
        output: String,
        /// Description of what went wrong.
        message: String,
    },

    /// A screenshot could not be decoded.
    #[error("failed to decode image {path}: {source}")]
    ImageDecode {
        /// Path of the screenshot.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: image::ImageError,
    },

    /// A blurred image could not be written.
    #[error("failed to encode image {path}: {source}")]
    ImageEncode {
        /// Destination path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: image::ImageError,
    },

    // === Presenter Errors ===
    /// The number of lock images does not match the number of monitors.
    #[error("found {monitors} monitor(s) but prepared {images} lock image(s)")]
    MonitorMismatch {
        /// Number of blurred images.
        images: usize,
        /// Number of monitors reported by the toolkit.
        monitors: usize,
    },

    /// Platform-specific operation failed.
    #[error("platform error: {0}")]
    Platform(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for frostlock operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new platform error.
    #[must_use]
    pub fn platform(message: impl Into<String>) -> Self {
        Self::Platform(message.into())
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a capture failure for an output.
    #[must_use]
    pub fn capture_failed(output: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CaptureFailed {
            output: output.into(),
            message: message.into(),
        }
    }

    /// Check if this error happened while preparing the lock screen,
    /// i.e. before any window was shown.
    #[must_use]
    pub fn is_startup_error(&self) -> bool {
        matches!(
            self,
            Self::OutputQuery { .. }
                | Self::NoOutputs
                | Self::CaptureFailed { .. }
                | Self::ImageDecode { .. }
                | Self::ImageEncode { .. }
                | Self::MonitorMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::NoOutputs.to_string(),
            "compositor reported no active outputs"
        );

        let err = Error::platform("no display");
        assert_eq!(err.to_string(), "platform error: no display");
    }

    #[test]
    fn test_monitor_mismatch_display() {
        let err = Error::MonitorMismatch {
            images: 1,
            monitors: 2,
        };
        assert_eq!(
            err.to_string(),
            "found 2 monitor(s) but prepared 1 lock image(s)"
        );
    }

    #[test]
    fn test_capture_failed_display() {
        let err = Error::capture_failed("DP-1", "exited with status 1");
        let msg = err.to_string();
        assert!(msg.contains("DP-1"));
        assert!(msg.contains("exited with status 1"));
    }

    #[test]
    fn test_output_query_display() {
        let err = Error::OutputQuery {
            command: "swaymsg".to_string(),
            message: "not found".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("swaymsg"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn test_is_startup_error() {
        assert!(Error::NoOutputs.is_startup_error());
        assert!(Error::capture_failed("eDP-1", "boom").is_startup_error());
        assert!(Error::MonitorMismatch {
            images: 0,
            monitors: 1
        }
        .is_startup_error());
        assert!(!Error::internal("bug").is_startup_error());
        assert!(!Error::platform("gtk").is_startup_error());
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<Vec<String>, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "blur_sigma must be positive".to_string(),
        };
        assert!(err.to_string().contains("blur_sigma"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
