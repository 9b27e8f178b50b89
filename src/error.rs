// src/error.rs

//! Unified error handling for the campaign publisher.

use thiserror::Error;

/// Result type alias for publisher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
///
/// The six leading variants are the stage-level signals; the remaining
/// variants are internal plumbing and never cross a stage boundary. Each
/// pipeline stage logs residual failures in full and converts them to its
/// own signal before returning.
#[derive(Error, Debug)]
pub enum AppError {
    /// Results could not be retrieved from the DB
    #[error("DB fetch error: {0}")]
    DbFetch(String),

    /// Listing or downloading campaign artifacts failed
    #[error("artifact download error: {0}")]
    ArtifactDownload(String),

    /// Local filesystem failure while building the archive
    #[error("archive write error: {0}")]
    ArchiveWrite(String),

    /// A required configuration value is missing or invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// No usable object-store credentials could be resolved
    #[error("credentials error: {0}")]
    Credentials(String),

    /// Archive upload failed for any other reason
    #[error("publish error: {0}")]
    Publish(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Zip archive operation failed
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Object-store request failed
    #[error("S3 error: {0}")]
    S3(String),
}

impl AppError {
    /// Create a DB fetch error.
    pub fn db_fetch(message: impl Into<String>) -> Self {
        Self::DbFetch(message.into())
    }

    /// Create an artifact download error.
    pub fn artifact_download(message: impl Into<String>) -> Self {
        Self::ArtifactDownload(message.into())
    }

    /// Create an archive write error.
    pub fn archive_write(message: impl Into<String>) -> Self {
        Self::ArchiveWrite(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a credentials error.
    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials(message.into())
    }

    /// Create a publish error.
    pub fn publish(message: impl Into<String>) -> Self {
        Self::Publish(message.into())
    }

    /// Create an object-store error.
    pub fn s3(message: impl Into<String>) -> Self {
        Self::S3(message.into())
    }
}
