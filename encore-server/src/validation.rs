//! Request validation module
//!
//! Provides validation utilities for path and query parameters.

use crate::error::ApiError;

/// Maximum accepted length of an album, image or slug identifier
pub const MAX_ID_LEN: usize = 128;

/// Largest page size forwarded to the photo API
pub const MAX_PAGE_COUNT: usize = 1000;

/// Validates an album or image key taken from the path
///
/// Keys are trimmed; blank keys, overlong keys and keys containing characters
/// other than ASCII alphanumerics, `-` or `_` are rejected.
pub fn validate_key<'a>(value: &'a str, what: &str) -> Result<&'a str, ApiError> {
    let key = value.trim();
    if key.is_empty() {
        return Err(ApiError::bad_request(format!("Missing {what}")));
    }
    if key.len() > MAX_ID_LEN {
        return Err(ApiError::bad_request(format!(
            "{what} too long: {} characters exceeds maximum of {MAX_ID_LEN}",
            key.len()
        )));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ApiError::bad_request(format!("Invalid {what}: '{key}'")));
    }
    Ok(key)
}

/// Validates a band slug taken from the path
pub fn validate_slug(value: &str) -> Result<&str, ApiError> {
    let slug = value.trim();
    if slug.is_empty() {
        return Err(ApiError::bad_request("Missing slug"));
    }
    if slug.len() > MAX_ID_LEN || slug.contains('/') {
        return Err(ApiError::bad_request(format!("Invalid slug: '{slug}'")));
    }
    Ok(slug)
}

/// Validates listing paging parameters (`count` 1..=1000, `start` >= 1)
pub fn validate_paging(count: usize, start: usize) -> Result<(), ApiError> {
    if count == 0 || count > MAX_PAGE_COUNT {
        return Err(ApiError::bad_request(format!(
            "count must be between 1 and {MAX_PAGE_COUNT}"
        )));
    }
    if start == 0 {
        return Err(ApiError::bad_request("start is 1-based"));
    }
    Ok(())
}

/// Interprets a `0|1` style query flag; `1` and `true` enable it
pub fn query_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}
