// src/storage/s3.rs

//! S3-compatible object store client.
//!
//! Wraps `aws-sdk-s3` with the three operations the pipeline needs: prefix
//! listing, download-to-file and upload-from-file. Transfers at or above the
//! provider's multipart threshold are split into ranged chunks (downloads)
//! or multipart parts (uploads); everything below goes through a single
//! request.

use std::path::Path;

use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{ProvideCredentials, SharedCredentialsProvider};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use log::{debug, info};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::storage::{ObjectEntry, TransferLimits};

/// Where object-store credentials may be supplied.
const CREDENTIALS_HINT: &str =
    "please fill ~/.aws/credentials or set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY in env";

/// Object-store client bound to one bucket and one transfer configuration.
pub struct ObjectStore {
    client: Client,
    bucket: String,
    limits: TransferLimits,
    credentials: Option<SharedCredentialsProvider>,
}

impl ObjectStore {
    /// Create an object store from an existing client.
    pub fn new(client: Client, bucket: impl Into<String>, limits: TransferLimits) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            limits,
            credentials: None,
        }
    }

    /// Attach a credentials provider for [`ObjectStore::verify_credentials`].
    pub fn with_credentials(mut self, credentials: SharedCredentialsProvider) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Connect to the endpoint configured in `settings`.
    ///
    /// Credentials come from the SDK's default provider chain (environment
    /// variables or `~/.aws/credentials`). Path-style addressing is forced
    /// because the endpoint is a plain URL, not a virtual-host domain.
    pub async fn connect(settings: &Settings) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(&settings.s3_endpoint_url)
            .load()
            .await;
        let credentials = sdk_config.credentials_provider();
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: settings.bucket.clone(),
            limits: settings.provider().transfer_limits(),
            credentials,
        }
    }

    /// Resolve credentials eagerly, before any upload is attempted.
    pub async fn verify_credentials(&self) -> Result<()> {
        let provider = self
            .credentials
            .as_ref()
            .ok_or_else(|| AppError::credentials(CREDENTIALS_HINT))?;
        provider.provide_credentials().await.map_err(|e| {
            debug!("credentials resolution failed: {e}");
            AppError::credentials(CREDENTIALS_HINT)
        })?;
        Ok(())
    }

    /// List every object whose key begins with `prefix`, following
    /// continuation tokens until the listing is exhausted.
    pub async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectEntry>> {
        let mut entries = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(s3_err)?;
            for object in page.contents() {
                if let Some(key) = object.key() {
                    entries.push(ObjectEntry {
                        key: key.to_string(),
                        size: object.size().unwrap_or(0).max(0) as u64,
                    });
                }
            }
        }

        debug!(
            "{} objects listed under s3://{}/{}",
            entries.len(),
            self.bucket,
            prefix
        );
        Ok(entries)
    }

    /// Download one object to `dest`, creating parent directories and
    /// overwriting any existing file.
    pub async fn download_to(&self, key: &str, size: u64, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        if size >= self.limits.multipart_threshold {
            self.download_chunked(key, size, dest).await
        } else {
            let output = self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
                .map_err(s3_err)?;
            let bytes = output.body.collect().await.map_err(s3_err)?.into_bytes();
            tokio::fs::write(dest, &bytes).await?;
            Ok(())
        }
    }

    /// Ranged download for objects at or above the multipart threshold.
    async fn download_chunked(&self, key: &str, size: u64, dest: &Path) -> Result<()> {
        let mut file = tokio::fs::File::create(dest).await?;
        let mut offset = 0u64;

        while offset < size {
            let end = (offset + self.limits.part_size).min(size) - 1;
            let output = self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(key)
                .range(format!("bytes={offset}-{end}"))
                .send()
                .await
                .map_err(s3_err)?;
            let bytes = output.body.collect().await.map_err(s3_err)?.into_bytes();
            file.write_all(&bytes).await?;
            offset = end + 1;
        }

        file.flush().await?;
        Ok(())
    }

    /// Upload a local file under `key` with the given content type.
    pub async fn upload_file(&self, path: &Path, key: &str, content_type: &str) -> Result<()> {
        let size = tokio::fs::metadata(path).await?.len();

        if size >= self.limits.multipart_threshold {
            self.upload_multipart(path, key, content_type, size).await?;
        } else {
            let body = ByteStream::from_path(path).await.map_err(s3_err)?;
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(key)
                .body(body)
                .content_type(content_type)
                .send()
                .await
                .map_err(s3_err)?;
        }

        info!("{} uploaded to s3://{}/{}", path.display(), self.bucket, key);
        Ok(())
    }

    /// Multipart upload for files at or above the multipart threshold.
    /// The upload is aborted best-effort if any part fails.
    async fn upload_multipart(
        &self,
        path: &Path,
        key: &str,
        content_type: &str,
        size: u64,
    ) -> Result<()> {
        let created = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .send()
            .await
            .map_err(s3_err)?;
        let upload_id = created
            .upload_id()
            .ok_or_else(|| AppError::s3("no upload id returned"))?
            .to_string();

        match self.upload_parts(path, key, &upload_id, size).await {
            Ok(parts) => {
                self.client
                    .complete_multipart_upload()
                    .bucket(&self.bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .multipart_upload(
                        CompletedMultipartUpload::builder()
                            .set_parts(Some(parts))
                            .build(),
                    )
                    .send()
                    .await
                    .map_err(s3_err)?;
                Ok(())
            }
            Err(err) => {
                let _ = self
                    .client
                    .abort_multipart_upload()
                    .bucket(&self.bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .send()
                    .await;
                Err(err)
            }
        }
    }

    async fn upload_parts(
        &self,
        path: &Path,
        key: &str,
        upload_id: &str,
        size: u64,
    ) -> Result<Vec<CompletedPart>> {
        let mut file = tokio::fs::File::open(path).await?;
        let mut parts = Vec::new();
        let mut part_number = 1i32;
        let mut remaining = size;

        while remaining > 0 {
            let chunk = remaining.min(self.limits.part_size);
            let mut buffer = vec![0u8; chunk as usize];
            file.read_exact(&mut buffer).await?;

            let uploaded = self
                .client
                .upload_part()
                .bucket(&self.bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(ByteStream::from(buffer))
                .send()
                .await
                .map_err(s3_err)?;

            parts.push(
                CompletedPart::builder()
                    .part_number(part_number)
                    .set_e_tag(uploaded.e_tag().map(str::to_string))
                    .build(),
            );
            part_number += 1;
            remaining -= chunk;
        }

        Ok(parts)
    }
}

/// Flatten an SDK error into the application error type, keeping the full
/// error source chain in the message.
fn s3_err(err: impl std::error::Error + Send + Sync + 'static) -> AppError {
    AppError::s3(DisplayErrorContext(&err).to_string())
}
