//! Error types for the capture pipeline

use thiserror::Error;

/// Result type alias for capture operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while capturing a page
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to launch the browser or open a tab
    #[error("Browser launch failed: {0}")]
    Launch(String),

    /// Navigation failed or timed out (fatal for the request)
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// In-page script evaluation failed
    #[error("Script evaluation failed: {0}")]
    Script(String),

    /// Taking the raw screenshot failed
    #[error("Screenshot capture failed: {0}")]
    Capture(String),

    /// Compositing the browser bar onto the capture failed
    #[error("Compositing failed: {0}")]
    Compose(String),

    /// The request itself is malformed (bad URL, zero-sized viewport, ...)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Filesystem error while persisting batch output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}
