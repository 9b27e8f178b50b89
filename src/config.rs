// src/config.rs

//! Environment-derived configuration.
//!
//! All required settings are collected into one structure and validated once
//! at startup, so a missing value is reported before any network activity
//! begins instead of surfacing mid-pipeline.

use crate::error::{AppError, Result};
use crate::storage::Provider;
use crate::utils::url::parse_s3_url;

/// Results-API base URL.
pub const ENV_TEST_DB_URL: &str = "TEST_DB_URL";
/// Build identifier naming the current campaign run.
pub const ENV_BUILD_TAG: &str = "BUILD_TAG";
/// Object-store endpoint URL.
pub const ENV_S3_ENDPOINT_URL: &str = "S3_ENDPOINT_URL";
/// Object-store destination URL (`s3://bucket/prefix`).
pub const ENV_S3_DST_URL: &str = "S3_DST_URL";
/// Public base URL used to construct the published download link.
pub const ENV_HTTP_DST_URL: &str = "HTTP_DST_URL";

/// Validated runtime settings for one campaign run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Results-API base URL
    pub test_db_url: String,

    /// Build identifier for this run; used as query parameter, file names
    /// and object-store key segment
    pub build_tag: String,

    /// Object-store endpoint URL
    pub s3_endpoint_url: String,

    /// Destination bucket, from the `s3://` destination URL
    pub bucket: String,

    /// Destination key prefix with surrounding slashes trimmed (may be empty)
    pub s3_prefix: String,

    /// Public base URL for published archives
    pub http_dst_url: String,
}

impl Settings {
    /// Read and validate all required settings from the process environment.
    pub fn from_env() -> Result<Self> {
        let test_db_url = required(ENV_TEST_DB_URL)?;
        let build_tag = required(ENV_BUILD_TAG)?;
        let s3_endpoint_url = required(ENV_S3_ENDPOINT_URL)?;
        let s3_dst_url = required(ENV_S3_DST_URL)?;
        let http_dst_url = required(ENV_HTTP_DST_URL)?;

        let (bucket, s3_prefix) = parse_s3_url(&s3_dst_url)?;

        Ok(Self {
            test_db_url,
            build_tag,
            s3_endpoint_url,
            bucket,
            s3_prefix,
            http_dst_url,
        })
    }

    /// Provider classification for the configured endpoint.
    pub fn provider(&self) -> Provider {
        Provider::from_endpoint(&self.s3_endpoint_url)
    }

    /// Key prefix under which this campaign's artifacts are stored.
    pub fn campaign_prefix(&self) -> String {
        if self.s3_prefix.is_empty() {
            self.build_tag.clone()
        } else {
            format!("{}/{}", self.s3_prefix, self.build_tag)
        }
    }

    /// Object key the campaign archive is published under.
    pub fn archive_key(&self) -> String {
        if self.s3_prefix.is_empty() {
            self.zip_name()
        } else {
            format!("{}/{}", self.s3_prefix, self.zip_name())
        }
    }

    /// File name of the dumped result record.
    pub fn json_name(&self) -> String {
        format!("{}.json", self.build_tag)
    }

    /// File name of the campaign archive.
    pub fn zip_name(&self) -> String {
        format!("{}.zip", self.build_tag)
    }
}

/// Read a required environment variable, treating blank values as missing.
fn required(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::config(format!("please check env var: {key}"))),
    }
}
