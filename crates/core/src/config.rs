//! Upload settings, read from the gallery generator's settings file

use crate::error::{Error, Result};
use aws_sdk_s3::types::ObjectCannedAcl;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Settings table name inside the generator's settings file
const SETTINGS_TABLE: &str = "upload_s3";

/// Canned access-control policy applied to every uploaded object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Policy {
    #[serde(rename = "private")]
    Private,
    #[serde(rename = "public-read")]
    PublicRead,
    #[serde(rename = "public-read-write")]
    PublicReadWrite,
    #[serde(rename = "authenticated-read")]
    AuthenticatedRead,
}

impl Policy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::Private => "private",
            Policy::PublicRead => "public-read",
            Policy::PublicReadWrite => "public-read-write",
            Policy::AuthenticatedRead => "authenticated-read",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Policy> for ObjectCannedAcl {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Private => ObjectCannedAcl::Private,
            Policy::PublicRead => ObjectCannedAcl::PublicRead,
            Policy::PublicReadWrite => ObjectCannedAcl::PublicReadWrite,
            Policy::AuthenticatedRead => ObjectCannedAcl::AuthenticatedRead,
        }
    }
}

/// What to do when a single file's upload fails mid-run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Stop the run at the first failed transfer
    #[default]
    #[serde(rename = "abort")]
    Abort,
    /// Log the failure and keep uploading the remaining files
    #[serde(rename = "continue")]
    Continue,
}

/// The `[upload_s3]` table of the generator's settings file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadOptions {
    /// Target bucket name
    pub bucket: String,
    /// ACL applied to every uploaded object
    pub policy: Policy,
    /// Re-upload everything, ignoring remote state
    #[serde(default)]
    pub overwrite: bool,
    /// Behavior past a single failed upload
    #[serde(default)]
    pub on_error: FailurePolicy,
}

impl UploadOptions {
    /// Load options from the generator's settings file.
    ///
    /// Returns `Error::ConfigMissing` when the file has no `[upload_s3]`
    /// table, so the caller can warn and skip the upload instead of
    /// failing the build.
    pub fn from_settings_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::SettingsNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read settings file: {}", e)))?;

        Self::from_settings_str(&content)
    }

    /// Parse options out of a settings document already in memory.
    pub fn from_settings_str(content: &str) -> Result<Self> {
        let doc: toml::Value = toml::from_str(content)?;

        let table = match doc.get(SETTINGS_TABLE) {
            Some(table) => table.clone(),
            None => return Err(Error::ConfigMissing),
        };

        let options: UploadOptions = table
            .try_into()
            .map_err(|e: toml::de::Error| Error::InvalidConfig(e.to_string()))?;

        options.validate()?;
        Ok(options)
    }

    /// Validate option values
    pub fn validate(&self) -> Result<()> {
        if self.bucket.is_empty() {
            return Err(Error::InvalidConfig(
                "Bucket name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
