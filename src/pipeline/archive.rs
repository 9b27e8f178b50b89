// src/pipeline/archive.rs

//! CampaignArchiver: run the fetch and collect stages, then pack the result
//! record and the whole artifact tree into `{build_tag}.zip`.

use std::fs::File;
use std::path::{Path, PathBuf};

use log::{error, info};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::storage::ObjectStore;

use super::collect::run_collect;
use super::fetch::run_fetch;

/// Fetch the results, collect the artifacts and assemble the archive.
///
/// Stage errors from the dependencies propagate unchanged; filesystem
/// failures while writing the archive become [`AppError::ArchiveWrite`].
/// Returns the path of the created archive.
pub async fn run_archive(
    settings: &Settings,
    store: &ObjectStore,
    work_dir: &Path,
) -> Result<PathBuf> {
    run_fetch(settings, work_dir).await?;
    run_collect(settings, store, work_dir).await?;

    match zip_campaign_files(settings, work_dir) {
        Ok(path) => {
            info!("Campaign archive created at {}", path.display());
            Ok(path)
        }
        Err(err @ AppError::ArchiveWrite(_)) => Err(err),
        Err(err) => {
            error!("Cannot create the campaign archive: {err}");
            Err(AppError::archive_write(err.to_string()))
        }
    }
}

/// Build `{build_tag}.zip` with deflate compression: the result record at
/// the archive root, then every regular file of the artifact tree at its
/// relative path (rooted at the build tag, matching the on-disk layout).
fn zip_campaign_files(settings: &Settings, work_dir: &Path) -> Result<PathBuf> {
    let zip_path = work_dir.join(settings.zip_name());
    let mut zip = ZipWriter::new(File::create(&zip_path)?);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let json_name = settings.json_name();
    zip.start_file(&json_name, options)?;
    let mut record = File::open(work_dir.join(&json_name))?;
    std::io::copy(&mut record, &mut zip)?;

    let tree = work_dir.join(&settings.build_tag);
    if tree.is_dir() {
        // sorted walk keeps the member order deterministic
        for entry in WalkDir::new(&tree).sort_by_file_name() {
            let entry = entry.map_err(|e| AppError::archive_write(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(work_dir)
                .map_err(|e| AppError::archive_write(e.to_string()))?;
            let name = relative.to_string_lossy().replace('\\', "/");
            zip.start_file(name, options)?;
            let mut file = File::open(entry.path())?;
            std::io::copy(&mut file, &mut zip)?;
        }
    }

    zip.finish()?;
    Ok(zip_path)
}
