// src/pipeline/collect.rs

//! ArtifactCollector: download every artifact stored under the campaign's
//! key prefix into a local directory tree mirroring the object keys.

use std::path::{Component, Path, PathBuf};

use log::{error, info, warn};

use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::storage::ObjectStore;
use crate::utils::url::{decode_object_key, strip_base};

/// Download all artifacts under `{prefix}/{build_tag}/` into `work_dir`.
///
/// A failure on any single object aborts the whole collection; everything
/// collapses to [`AppError::ArtifactDownload`] at this boundary.
pub async fn run_collect(
    settings: &Settings,
    store: &ObjectStore,
    work_dir: &Path,
) -> Result<()> {
    match collect_artifacts(settings, store, work_dir).await {
        Ok(()) => Ok(()),
        Err(err @ AppError::ArtifactDownload(_)) => Err(err),
        Err(err) => {
            error!("Cannot collect the artifacts: {err}");
            Err(AppError::artifact_download(err.to_string()))
        }
    }
}

async fn collect_artifacts(
    settings: &Settings,
    store: &ObjectStore,
    work_dir: &Path,
) -> Result<()> {
    let prefix = settings.campaign_prefix();
    let entries = store.list_objects(&format!("{prefix}/")).await?;
    info!("{} artifacts found under {}/", entries.len(), prefix);

    for entry in entries {
        let decoded = decode_object_key(&entry.key);
        let relative = strip_base(&decoded, &settings.s3_prefix);
        if relative.is_empty() || relative.ends_with('/') {
            // zero-byte directory placeholder, nothing to download
            warn!("Skipping directory marker {}", entry.key);
            continue;
        }
        let dest = safe_join(work_dir, &relative)?;
        info!("Downloading {relative}");
        store.download_to(&entry.key, entry.size, &dest).await?;
    }

    Ok(())
}

/// Join a store-relative path onto the working directory, rejecting any
/// component that would escape the artifact tree.
fn safe_join(work_dir: &Path, relative: &str) -> Result<PathBuf> {
    let relative_path = Path::new(relative);
    for component in relative_path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => {
                return Err(AppError::artifact_download(format!(
                    "refusing to write outside the artifact tree: {relative}"
                )))
            }
        }
    }
    Ok(work_dir.join(relative_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Provider, TransferLimits};
    use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
    use aws_sdk_s3::Client;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings() -> Settings {
        Settings {
            test_db_url: "http://db.example.org/api/v1/results".to_string(),
            build_tag: "build42".to_string(),
            s3_endpoint_url: "http://127.0.0.1:9000".to_string(),
            bucket: "bucket".to_string(),
            s3_prefix: "prefix".to_string(),
            http_dst_url: "http://internal".to_string(),
        }
    }

    fn test_client(endpoint: &str) -> Client {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(Credentials::new("test", "test", None, None, "static"))
            .region(Region::new("us-east-1"))
            .endpoint_url(endpoint)
            .force_path_style(true)
            .build();
        Client::from_conf(config)
    }

    fn listing_xml(objects: &[(&str, usize)]) -> String {
        let contents: String = objects
            .iter()
            .map(|(key, size)| format!("<Contents><Key>{key}</Key><Size>{size}</Size></Contents>"))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
<Name>bucket</Name><Prefix>prefix/build42/</Prefix>
<KeyCount>{}</KeyCount><MaxKeys>1000</MaxKeys><IsTruncated>false</IsTruncated>
{contents}
</ListBucketResult>"#,
            objects.len()
        )
    }

    #[tokio::test]
    async fn collect_mirrors_keys_into_local_tree() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bucket/"))
            .and(query_param("list-type", "2"))
            .and(query_param("prefix", "prefix/build42/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                listing_xml(&[
                    ("prefix/build42/sub/report.html", 6),
                    ("prefix/build42/log.txt", 5),
                ]),
                "application/xml",
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/bucket/prefix/build42/sub/report.html"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"<html>".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/bucket/prefix/build42/log.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello".to_vec()))
            .mount(&server)
            .await;

        let store = ObjectStore::new(
            test_client(&server.uri()),
            "bucket",
            Provider::MultipartCapable.transfer_limits(),
        );
        let dir = TempDir::new().unwrap();
        run_collect(&settings(), &store, dir.path()).await.unwrap();

        let report = dir.path().join("build42/sub/report.html");
        let log = dir.path().join("build42/log.txt");
        assert_eq!(std::fs::read(report).unwrap(), b"<html>");
        assert_eq!(std::fs::read(log).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn large_objects_are_fetched_in_ranged_chunks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bucket/"))
            .and(query_param("list-type", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                listing_xml(&[("prefix/build42/big.bin", 11)]),
                "application/xml",
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/bucket/prefix/build42/big.bin"))
            .and(header("range", "bytes=0-3"))
            .respond_with(ResponseTemplate::new(206).set_body_bytes(b"hell".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/bucket/prefix/build42/big.bin"))
            .and(header("range", "bytes=4-7"))
            .respond_with(ResponseTemplate::new(206).set_body_bytes(b"o wo".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/bucket/prefix/build42/big.bin"))
            .and(header("range", "bytes=8-10"))
            .respond_with(ResponseTemplate::new(206).set_body_bytes(b"rld".to_vec()))
            .mount(&server)
            .await;

        let store = ObjectStore::new(
            test_client(&server.uri()),
            "bucket",
            TransferLimits {
                multipart_threshold: 4,
                part_size: 4,
            },
        );
        let dir = TempDir::new().unwrap();
        run_collect(&settings(), &store, dir.path()).await.unwrap();

        let big = dir.path().join("build42/big.bin");
        assert_eq!(std::fs::read(big).unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn listing_failure_collapses_to_artifact_download() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bucket/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = ObjectStore::new(
            test_client(&server.uri()),
            "bucket",
            Provider::MultipartCapable.transfer_limits(),
        );
        let dir = TempDir::new().unwrap();
        let err = run_collect(&settings(), &store, dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ArtifactDownload(_)));
    }

    #[test]
    fn safe_join_rejects_parent_components() {
        let dir = Path::new("/tmp/work");
        assert!(safe_join(dir, "../outside.txt").is_err());
        assert!(safe_join(dir, "build42/../../outside.txt").is_err());
        assert!(safe_join(dir, "build42/log.txt").is_ok());
    }
}
