//! Canonical counter keys from raw request paths.
//!
//! Normalization is deliberately conservative: it strips the query and
//! fragment and guarantees a single leading slash, but otherwise leaves
//! the path exactly as received. `/a/b/` and `/a/b` stay distinct keys
//! so that genuinely different traffic is never folded together.

use crate::error::{PathRankError, PathRankResult};

/// Normalize a raw request path into a canonical counter key.
///
/// Fails with `InvalidPath` when nothing is left after normalization.
pub fn normalize(raw_path: &str) -> PathRankResult<String> {
    let without_query = raw_path
        .split_once(['?', '#'])
        .map_or(raw_path, |(head, _)| head);

    let trimmed = without_query.trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(PathRankError::InvalidPath(format!(
            "empty path after normalization: {:?}",
            raw_path
        )));
    }

    Ok(format!("/{}", trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path_passes_through() {
        assert_eq!(normalize("/a/b/").unwrap(), "/a/b/");
        assert_eq!(normalize("/a/b").unwrap(), "/a/b");
    }

    #[test]
    fn test_leading_slash_is_canonical() {
        assert_eq!(normalize("a/b/").unwrap(), "/a/b/");
        assert_eq!(normalize("///a/b").unwrap(), "/a/b");
    }

    #[test]
    fn test_trailing_slash_stays_distinct() {
        let with = normalize("/a/b/").unwrap();
        let without = normalize("/a/b").unwrap();
        assert_ne!(with, without);
    }

    #[test]
    fn test_query_and_fragment_stripped() {
        assert_eq!(normalize("/a/b/?x=1&y=2").unwrap(), "/a/b/");
        assert_eq!(normalize("/a/b#section").unwrap(), "/a/b");
        assert_eq!(normalize("/a/b?x=1#frag").unwrap(), "/a/b");
    }

    #[test]
    fn test_empty_inputs_rejected() {
        for raw in ["", "/", "//", "?x=1", "/?x=1", "#frag", "/#frag"] {
            let err = normalize(raw).unwrap_err();
            assert!(
                matches!(err, PathRankError::InvalidPath(_)),
                "expected InvalidPath for {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_unicode_segments_preserved() {
        assert_eq!(normalize("/каталог/страница/").unwrap(), "/каталог/страница/");
    }
}
