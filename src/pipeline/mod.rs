// src/pipeline/mod.rs

//! Pipeline entry points for campaign publication.
//!
//! Stages run strictly in sequence: fetch → collect → archive → publish.
//! Any stage error aborts the run; nothing is retried.

pub mod archive;
pub mod collect;
pub mod fetch;
pub mod publish;

pub use archive::run_archive;
pub use collect::run_collect;
pub use fetch::run_fetch;
pub use publish::run_publish;

use std::path::Path;

use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::storage::ObjectStore;

/// Final outcome of one pipeline run, as seen by calling automation.
///
/// Exit code values keep the historical `EX_SOFTWARE - n` scheme so existing
/// automation can keep branching on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Everything is OK
    Ok,
    /// The results could not be collected from the DB
    DbFetchError,
    /// The artifacts could not be downloaded
    ArtifactDownloadError,
    /// Archiving or publishing failed (configuration, credentials or upload)
    ZipOrPublishError,
}

impl Outcome {
    /// Process exit code for this outcome.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::DbFetchError => 65,
            Self::ArtifactDownloadError => 64,
            Self::ZipOrPublishError => 63,
        }
    }

    /// Classify a stage error into its outcome code.
    pub fn from_error(err: &AppError) -> Self {
        match err {
            AppError::DbFetch(_) => Self::DbFetchError,
            AppError::ArtifactDownload(_) => Self::ArtifactDownloadError,
            _ => Self::ZipOrPublishError,
        }
    }
}

/// Run the whole archive-and-publish pipeline in `work_dir` and return the
/// public link of the published archive.
pub async fn run_pipeline(settings: &Settings, work_dir: &Path) -> Result<String> {
    let store = ObjectStore::connect(settings).await;
    let zip_path = run_archive(settings, &store, work_dir).await?;
    run_publish(settings, &store, &zip_path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Provider;
    use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
    use aws_sdk_s3::Client;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn exit_codes_keep_the_historical_values() {
        assert_eq!(Outcome::Ok.exit_code(), 0);
        assert_eq!(Outcome::DbFetchError.exit_code(), 65);
        assert_eq!(Outcome::ArtifactDownloadError.exit_code(), 64);
        assert_eq!(Outcome::ZipOrPublishError.exit_code(), 63);
    }

    #[test]
    fn classification_covers_every_stage_signal() {
        assert_eq!(
            Outcome::from_error(&AppError::db_fetch("x")),
            Outcome::DbFetchError
        );
        assert_eq!(
            Outcome::from_error(&AppError::artifact_download("x")),
            Outcome::ArtifactDownloadError
        );
        assert_eq!(
            Outcome::from_error(&AppError::archive_write("x")),
            Outcome::ZipOrPublishError
        );
        assert_eq!(
            Outcome::from_error(&AppError::config("x")),
            Outcome::ZipOrPublishError
        );
        assert_eq!(
            Outcome::from_error(&AppError::credentials("x")),
            Outcome::ZipOrPublishError
        );
        assert_eq!(
            Outcome::from_error(&AppError::publish("x")),
            Outcome::ZipOrPublishError
        );
    }

    #[tokio::test]
    async fn fetch_failure_aborts_before_the_collector_runs() {
        let db = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/results"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&db)
            .await;
        // the object store must never be contacted
        let object_store = MockServer::start().await;

        let settings = Settings {
            test_db_url: format!("{}/api/v1/results", db.uri()),
            build_tag: "build42".to_string(),
            s3_endpoint_url: object_store.uri(),
            bucket: "bucket".to_string(),
            s3_prefix: "prefix".to_string(),
            http_dst_url: "http://internal".to_string(),
        };

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(Credentials::new("test", "test", None, None, "static"))
            .region(Region::new("us-east-1"))
            .endpoint_url(object_store.uri())
            .force_path_style(true)
            .build();
        let store = ObjectStore::new(
            Client::from_conf(config),
            "bucket",
            Provider::MultipartCapable.transfer_limits(),
        );

        let dir = TempDir::new().unwrap();
        let err = run_archive(&settings, &store, dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DbFetch(_)));
        assert!(!dir.path().join("build42.json").exists());
        assert!(!dir.path().join("build42").exists());
        assert!(object_store.received_requests().await.unwrap().is_empty());
    }
}
