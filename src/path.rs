use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DUP_SLASHES: Regex = Regex::new("/{2,}").unwrap();
}

/// Collapse every run of two or more slashes into a single one.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if path.is_empty() {
        return Cow::Borrowed(path);
    }
    DUP_SLASHES.replace_all(path, "/")
}

/// Request path under `/v1`; an empty path maps to `/v1` itself.
pub(crate) fn api_path(path: &str) -> String {
    let normalized = normalize_path(path);
    if normalized.is_empty() || normalized.starts_with('/') {
        format!("/v1{}", normalized)
    } else {
        format!("/v1/{}", normalized)
    }
}
