// src/models/result.rs

//! Campaign result records as returned by the results DB.
//!
//! The DB response is `{"results": [{"details": {"links": [..]}}, ..]}`.
//! Sibling fields at every level are carried through untouched so the dumped
//! record stays byte-stable across runs with unchanged upstream data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::url::strip_base;

/// The full result record of one campaign run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignResult {
    /// Per-test results, in DB order
    pub results: Vec<TestResult>,

    /// Fields the results API returns alongside `results`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One test's result entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    /// Details block carrying the artifact links
    pub details: TestDetails,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Details block of a test result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestDetails {
    /// Artifact link strings, in DB order
    pub links: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CampaignResult {
    /// Rewrite every artifact link to a store-relative path by stripping a
    /// leading occurrence of the internal base URL. Already-relative links
    /// are left unchanged, so the rewrite is idempotent.
    pub fn strip_links(&mut self, internal_base: &str) {
        for result in &mut self.results {
            for link in &mut result.details.links {
                *link = strip_base(link, internal_base);
            }
        }
    }
}
