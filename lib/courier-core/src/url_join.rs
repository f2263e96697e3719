//! Base URL and path joining.

use crate::{QueryMap, Result};

/// Join a base URL and a path with exactly one slash between them.
///
/// One trailing slash is stripped from `base` and one leading slash from
/// `path`. An empty path yields the base without any trailing slash.
/// Nothing is percent-encoded here.
///
/// ```
/// use courier_core::join_url;
///
/// assert_eq!(join_url("https://api.example.com/", "/users"), "https://api.example.com/users");
/// assert_eq!(join_url("https://api.example.com/", ""), "https://api.example.com");
/// ```
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    if path.is_empty() {
        // Every trailing slash goes, not just one: the bare base never ends in `/`.
        return base.trim_end_matches('/').to_string();
    }

    let base = base.strip_suffix('/').unwrap_or(base);
    let path = path.strip_prefix('/').unwrap_or(path);
    format!("{base}/{path}")
}

/// Merge the query embedded in `path` with an explicit query mapping.
///
/// The part after the first `?` is parsed into a mapping, the explicit
/// mapping is overlaid key by key (explicit wins), and the result is
/// re-encoded onto the path. A path without a resulting query is returned
/// without `?`.
pub fn merge_path_query(path: &str, explicit: &QueryMap) -> Result<String> {
    let (bare, mut query) = match path.split_once('?') {
        Some((bare, inline)) => (bare, QueryMap::parse(inline)?),
        None => (path, QueryMap::new()),
    };
    query.merge(explicit);

    if query.is_empty() {
        return Ok(bare.to_string());
    }
    Ok(format!("{bare}?{}", query.encode()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_exactly_one_slash() {
        let cases = [
            ("https://a.test/", "/x"),
            ("https://a.test/", "x"),
            ("https://a.test", "/x"),
            ("https://a.test", "x"),
        ];
        for (base, path) in cases {
            assert_eq!(join_url(base, path), "https://a.test/x", "{base} + {path}");
        }
    }

    #[test]
    fn join_strips_only_one_slash() {
        assert_eq!(join_url("https://a.test/v1/", "//x"), "https://a.test/v1//x");
    }

    #[test]
    fn join_empty_path_has_no_trailing_slash() {
        assert_eq!(join_url("https://a.test/api/", ""), "https://a.test/api");
        assert_eq!(join_url("https://a.test/api", ""), "https://a.test/api");
        assert!(!join_url("https://a.test//", "").ends_with('/'));
    }

    #[test]
    fn merge_inline_and_explicit_query() {
        let explicit: QueryMap = [("a", "2"), ("b", "3")].into_iter().collect();
        let path = merge_path_query("/items?a=1", &explicit).expect("merge");
        assert_eq!(path, "/items?a=2&b=3");
    }

    #[test]
    fn merge_keeps_inline_only_query() {
        let path = merge_path_query("/items?page=2", &QueryMap::new()).expect("merge");
        assert_eq!(path, "/items?page=2");
    }

    #[test]
    fn merge_without_any_query() {
        let path = merge_path_query("/items", &QueryMap::new()).expect("merge");
        assert_eq!(path, "/items");

        let path = merge_path_query("/items?", &QueryMap::new()).expect("merge");
        assert_eq!(path, "/items");
    }

    #[test]
    fn merge_splits_at_first_question_mark() {
        let path = merge_path_query("/search?q=a?b", &QueryMap::new()).expect("merge");
        assert_eq!(path, "/search?q=a%3Fb");
    }
}
