//! Error types for galsync-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for galsync-core
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for galsync-core
#[derive(Error, Debug)]
pub enum Error {
    /// The `upload_s3` settings table is absent; the uploader does not run
    #[error("Upload to S3 is not configured (no [upload_s3] table)")]
    ConfigMissing,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Settings file not found
    #[error("Settings file not found: {0}")]
    SettingsNotFound(PathBuf),

    /// Invalid configuration format
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Local root missing or not a directory
    #[error("Destination directory unusable: {0}")]
    BadRoot(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory walk error
    #[error("Failed to scan local tree: {0}")]
    Walk(#[from] walkdir::Error),

    /// File name cannot be turned into an object key
    #[error("Path is not valid UTF-8, cannot form an object key: {0}")]
    NonUnicodePath(PathBuf),

    /// Deserialization error
    #[error("Failed to parse settings: {0}")]
    Deserialization(#[from] toml::de::Error),

    /// Authentication failure against the storage service
    #[error("Storage authentication failed: {0}")]
    RemoteAuth(String),

    /// Cannot reach the storage service
    #[error("Storage connection failed: {0}")]
    RemoteConnection(String),

    /// Metadata lookup for a key failed (other than "no such key")
    #[error("Metadata lookup failed for '{key}': {message}")]
    Head { key: String, message: String },

    /// A specific object's upload failed
    #[error("Upload failed for '{key}': {message}")]
    Transfer { key: String, message: String },

    /// AWS SDK error
    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<aws_sdk_s3::Error> for Error {
    fn from(err: aws_sdk_s3::Error) -> Self {
        Error::AwsSdk(err.to_string())
    }
}

// Generic SdkError conversion for all S3 operations
impl<E> From<aws_sdk_s3::error::SdkError<E>> for Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: aws_sdk_s3::error::SdkError<E>) -> Self {
        Error::AwsSdk(err.to_string())
    }
}

// ByteStreamError conversion
impl From<aws_sdk_s3::primitives::ByteStreamError> for Error {
    fn from(err: aws_sdk_s3::primitives::ByteStreamError) -> Self {
        Error::AwsSdk(err.to_string())
    }
}
