// src/pipeline/fetch.rs

//! ResultFetcher: dump the campaign's results from the DB.
//!
//! Issues `GET {TEST_DB_URL}?build_tag={tag}`, rewrites embedded artifact
//! links to store-relative paths and persists the record as
//! `{tag}.json` in the working directory.

use std::path::Path;

use log::{debug, error, info};

use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::models::CampaignResult;

/// Identifying User-Agent sent with every results-API request.
const USER_AGENT: &str = concat!("campaign-publisher/", env!("CARGO_PKG_VERSION"));

/// Fetch, rewrite and persist the campaign result record.
///
/// Every failure inside the stage collapses to [`AppError::DbFetch`]; the
/// JSON file is only written after the whole record has been parsed and
/// rewritten, so nothing is persisted on failure.
pub async fn run_fetch(settings: &Settings, work_dir: &Path) -> Result<()> {
    match fetch_and_dump(settings, work_dir).await {
        Ok(()) => Ok(()),
        Err(err @ AppError::DbFetch(_)) => Err(err),
        Err(err) => {
            error!("The results cannot be collected from DB: {err}");
            Err(AppError::db_fetch(err.to_string()))
        }
    }
}

async fn fetch_and_dump(settings: &Settings, work_dir: &Path) -> Result<()> {
    let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

    info!(
        "Fetching campaign results for {} from {}",
        settings.build_tag, settings.test_db_url
    );
    let response = client
        .get(&settings.test_db_url)
        .query(&[("build_tag", settings.build_tag.as_str())])
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .send()
        .await?
        .error_for_status()?;

    let mut record: CampaignResult = response.json().await?;
    debug!("data from DB: {} results", record.results.len());

    record.strip_links(&settings.http_dst_url);

    let path = work_dir.join(settings.json_name());
    tokio::fs::write(&path, serde_json::to_vec(&record)?).await?;
    info!("Campaign results written to {}", path.display());
    Ok(())
}
