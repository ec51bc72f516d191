use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or deriving telemetry series
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Archive path does not exist
    #[error("archive not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// Archive exists but could not be parsed
    #[error("failed to parse archive {}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Requested channel is absent from the archive
    #[error("channel '{0}' not found in archive")]
    MissingChannel(String),

    /// Zero-length or malformed series
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Drawing backend failure
    #[error("render error: {0}")]
    Render(String),
}

/// Type alias for Results using TelemetryError
pub type Result<T> = std::result::Result<T, TelemetryError>;
