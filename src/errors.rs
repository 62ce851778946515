/*!
 * Error types for the vttcast application.
 *
 * Every startup phase maps onto one variant so the binary can report
 * which phase failed before exiting. None of them are retried.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// The transcript could not be read or is not valid UTF-8 text
    #[error("Failed to read transcript {path:?}: {source}")]
    SourceRead {
        /// Path of the transcript
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An output artifact could not be written
    #[error("Failed to write {path:?}: {source}")]
    SinkWrite {
        /// Path of the destination
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The external segmentation tool could not be launched or exited non-zero
    #[error("Segmentation failed: {0}")]
    Segmentation(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// The HTTP server could not bind or stopped with an error
    #[error("Server error: {0}")]
    Server(String),
}

impl AppError {
    /// Short name of the startup phase this error belongs to
    pub fn phase(&self) -> &'static str {
        match self {
            Self::SourceRead { .. } => "transcript",
            Self::SinkWrite { .. } => "output",
            Self::Segmentation(_) => "segmentation",
            Self::Config(_) => "configuration",
            Self::Server(_) => "server",
        }
    }
}
