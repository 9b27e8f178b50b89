// src/pipeline/publish.rs

//! ArchivePublisher: upload the campaign archive to the object store and
//! derive the public download link.

use std::path::Path;

use log::{error, info};

use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::storage::ObjectStore;
use crate::utils::url::join_url;

/// Upload `zip_path` under the configured destination and return the public
/// link.
///
/// Failure modes are kept distinct: a missing setting is [`AppError::Config`],
/// unresolvable credentials are [`AppError::Credentials`] with guidance on
/// where they belong, and everything else collapses to [`AppError::Publish`].
pub async fn run_publish(
    settings: &Settings,
    store: &ObjectStore,
    zip_path: &Path,
) -> Result<String> {
    store.verify_credentials().await?;

    match publish_archive(settings, store, zip_path).await {
        Ok(link) => Ok(link),
        Err(err @ (AppError::Config(_) | AppError::Credentials(_))) => Err(err),
        Err(err) => {
            error!("Cannot publish the archive: {err}");
            Err(AppError::publish(err.to_string()))
        }
    }
}

async fn publish_archive(
    settings: &Settings,
    store: &ObjectStore,
    zip_path: &Path,
) -> Result<String> {
    let zip_name = settings.zip_name();
    let content_type = content_type_for(&zip_name);
    store
        .upload_file(zip_path, &settings.archive_key(), content_type)
        .await?;

    let link = join_url(&settings.http_dst_url, &zip_name);
    info!("All data were successfully published:\n\n{link}");
    Ok(link)
}

/// Guess a content type from the file name, falling back to a generic
/// binary type.
fn content_type_for(name: &str) -> &'static str {
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some("zip") => "application/zip",
        Some("json") => "application/json",
        Some("html") => "text/html",
        Some("txt") | Some("log") => "text/plain",
        _ => "application/octet-stream",
    }
}
