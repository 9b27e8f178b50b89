// src/utils/url.rs

//! URL and object-key manipulation utilities.

use crate::error::{AppError, Result};

/// Strip a leading `base` prefix (trailing slashes collapsed) from `value`.
///
/// Used both to rewrite artifact links to store-relative paths and to turn
/// object keys into local paths. The strip is an exact prefix match and is
/// idempotent: an already-stripped value comes back unchanged.
///
/// # Examples
/// ```
/// use campaign_publisher::utils::url::strip_base;
///
/// assert_eq!(strip_base("http://internal/x/a.log", "http://internal"), "x/a.log");
/// assert_eq!(strip_base("x/a.log", "http://internal"), "x/a.log");
/// ```
pub fn strip_base(value: &str, base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        return value.trim_start_matches('/').to_string();
    }
    match value.strip_prefix(base) {
        Some(rest) => rest.trim_start_matches('/').to_string(),
        None => value.to_string(),
    }
}

/// Decode a percent-encoded object key, treating `+` as a space.
///
/// Keys come percent-encoded off the wire and must be decoded before they
/// are used as local paths. Invalid percent sequences decode lossily rather
/// than failing the whole collection.
pub fn decode_object_key(key: &str) -> String {
    let plus_decoded = key.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(plus_decoded.as_bytes())).into_owned()
}

/// Split an `s3://bucket/prefix` destination URL into bucket and key prefix.
///
/// The prefix has surrounding slashes trimmed and may be empty.
pub fn parse_s3_url(dst: &str) -> Result<(String, String)> {
    let parsed = url::Url::parse(dst)?;
    let bucket = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| AppError::config(format!("no bucket in destination URL: {dst}")))?
        .to_string();
    let prefix = parsed.path().trim_matches('/').to_string();
    Ok((bucket, prefix))
}

/// Join a public base URL with a file name.
pub fn join_url(base: &str, name: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), name)
}
