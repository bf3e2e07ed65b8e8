//! Normalized archive destination URIs.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ArchiveError, ArchiveResult};

/// `scheme://segment(/segment)*` with an optional trailing slash; the
/// trailing slash is appended during normalization if absent.
fn grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        Regex::new(r"^[a-z][a-z0-9+.-]*://[A-Za-z0-9._-]+(/[A-Za-z0-9._-]+)*/?$")
            .expect("archive URI grammar")
    })
}

/// A normalized object-storage URI, e.g. `s3://bucket/prefix/`.
///
/// Always ends with `/`. Construction validates against the grammar, so
/// a held `ArchiveUri` is known to be well-formed; normalization is
/// idempotent by construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchiveUri(String);

impl ArchiveUri {
    /// Validate and normalize `uri`. Anything outside the grammar is
    /// rejected before it can be persisted or compared.
    pub fn parse(uri: &str) -> ArchiveResult<Self> {
        if !grammar().is_match(uri) {
            return Err(ArchiveError::InvalidUri(uri.to_string()));
        }
        let mut normalized = uri.to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        Ok(Self(normalized))
    }

    /// Wrap a string already known to be normalized (derived from a
    /// validated base by appending validated segments).
    pub(crate) fn already_normalized(uri: String) -> Self {
        debug_assert!(uri.ends_with('/'));
        Self(uri)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchiveUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_trailing_slash() {
        let uri = ArchiveUri::parse("s3://bucket/prefix").unwrap();
        assert_eq!(uri.as_str(), "s3://bucket/prefix/");
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["s3://bucket", "s3://bucket/", "gs://b/a/c", "gs://b/a/c/"] {
            let once = ArchiveUri::parse(raw).unwrap();
            let twice = ArchiveUri::parse(once.as_str()).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn rejects_malformed_uris() {
        for bad in [
            "",
            "bucket/prefix",
            "s3:/bucket",
            "s3://",
            "s3://bucket//double",
            "s3://bucket/pre fix",
            "S3://bucket",
            "s3://bucket/$x",
        ] {
            let err = ArchiveUri::parse(bad).unwrap_err();
            assert!(matches!(err, ArchiveError::InvalidUri(ref v) if v == bad), "{bad}");
        }
    }
}
