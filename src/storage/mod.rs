// src/storage/mod.rs

//! Object-store access layer.
//!
//! Provider classification and transfer limits are computed once from the
//! configured endpoint; the [`ObjectStore`] applies them to every listed,
//! downloaded or uploaded object.

pub mod s3;

pub use s3::ObjectStore;

/// Multipart threshold used for providers that accept chunked transfers.
const DEFAULT_MULTIPART_THRESHOLD: u64 = 8 * 1024 * 1024;

/// Threshold that effectively disables chunked transfers (5 PiB).
const MULTIPART_DISABLED_THRESHOLD: u64 = 5 * 1024_u64.pow(5);

/// Object-store provider classification, derived from the endpoint URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Accepts standard multipart semantics
    MultipartCapable,

    /// Rejects multipart semantics (Google Cloud Storage's S3 interface)
    MultipartIncompatible,
}

impl Provider {
    /// Classify the provider behind an endpoint URL.
    pub fn from_endpoint(endpoint: &str) -> Self {
        if endpoint.contains("google") {
            Self::MultipartIncompatible
        } else {
            Self::MultipartCapable
        }
    }

    /// Transfer limits appropriate for this provider.
    pub fn transfer_limits(self) -> TransferLimits {
        match self {
            Self::MultipartCapable => TransferLimits {
                multipart_threshold: DEFAULT_MULTIPART_THRESHOLD,
                part_size: DEFAULT_MULTIPART_THRESHOLD,
            },
            Self::MultipartIncompatible => TransferLimits {
                multipart_threshold: MULTIPART_DISABLED_THRESHOLD,
                part_size: MULTIPART_DISABLED_THRESHOLD,
            },
        }
    }
}

/// Chunking configuration for a single logical transfer.
#[derive(Debug, Clone, Copy)]
pub struct TransferLimits {
    /// Object size at or above which a transfer is split into chunks
    pub multipart_threshold: u64,

    /// Size of each chunk
    pub part_size: u64,
}

/// One listed object: its raw key and size in bytes.
#[derive(Debug, Clone)]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
}
