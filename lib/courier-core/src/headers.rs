//! Header sets, authorization and header precedence.
//!
//! [`merge_headers`] combines the standing configuration with per-call
//! overrides. Sources are applied lowest precedence first:
//!
//! 1. fixed headers from [`ClientConfig`]
//! 2. `Cache-Control: no-cache`
//! 3. `Content-Type`, when a content type is set
//! 4. `Authorization`, when configured
//! 5. `Cookie`, when the cookie store is non-empty
//! 6. one-time overrides

use std::collections::HashMap;
use std::fmt;

use base64::Engine;
use http::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, COOKIE};

use crate::ClientConfig;

/// A set of headers with case-insensitive names.
///
/// Names are stored lowercased; inserting an existing name replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: HashMap<String, String>,
}

impl HeaderSet {
    /// Creates an empty header set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a header, returning the previous value for that name.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> Option<String> {
        self.entries
            .insert(name.as_ref().to_ascii_lowercase(), value.into())
    }

    /// Removes a header, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(&name.to_ascii_lowercase())
    }

    /// Single header value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns `true` if a header with that name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    /// Number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every header.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates over `(name, value)` pairs; names are lowercase.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Overlays `other` on top of this set; `other` wins on collision.
    pub fn overlay(&mut self, other: &Self) {
        for (name, value) in &other.entries {
            self.entries.insert(name.clone(), value.clone());
        }
    }

    /// Consume into a plain map keyed by lowercase name.
    #[must_use]
    pub fn into_map(self) -> HashMap<String, String> {
        self.entries
    }
}

impl<K, V> Extend<(K, V)> for HeaderSet
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderSet
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        headers.extend(iter);
        headers
    }
}

impl From<HashMap<String, String>> for HeaderSet {
    fn from(map: HashMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

/// An `Authorization` header value: a scheme and its credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    scheme: String,
    value: String,
}

impl Authorization {
    /// Generic authorization with an arbitrary scheme.
    #[must_use]
    pub fn new(scheme: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            value: value.into(),
        }
    }

    /// `Basic` authorization; credentials are base64-encoded as `username:password`.
    #[must_use]
    pub fn basic(username: impl AsRef<str>, password: impl AsRef<str>) -> Self {
        let credentials = format!("{}:{}", username.as_ref(), password.as_ref());
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
        Self::new("Basic", encoded)
    }

    /// `Bearer` authorization.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::new("Bearer", token)
    }

    /// `Token` authorization.
    #[must_use]
    pub fn token(token: impl Into<String>) -> Self {
        Self::new("Token", token)
    }

    /// Authorization scheme, e.g. `Bearer`.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Credentials following the scheme.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.scheme, self.value)
    }
}

/// Build the effective header set for one request.
///
/// `content_type` is the value sent as `Content-Type`; it is usually the
/// configured tag, but a multipart body substitutes its boundary-bearing type.
/// An empty `content_type` sets no header.
#[must_use]
pub fn merge_headers(
    config: &ClientConfig,
    content_type: &str,
    overrides: Option<&HeaderSet>,
) -> HeaderSet {
    let mut headers = config.headers().clone();

    headers.insert(CACHE_CONTROL, "no-cache");

    if !content_type.is_empty() {
        headers.insert(CONTENT_TYPE, content_type);
    }

    if let Some(authorization) = config.authorization() {
        headers.insert(AUTHORIZATION, authorization.to_string());
    }

    if !config.cookies().is_empty() {
        headers.insert(COOKIE, config.cookies().serialize());
    }

    if let Some(overrides) = overrides {
        headers.overlay(overrides);
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_set_is_case_insensitive() {
        let mut headers = HeaderSet::new();
        headers.insert("X-Trace", "1");
        headers.insert("x-trace", "2");

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("X-TRACE"), Some("2"));
        assert!(headers.contains("x-Trace"));

        assert_eq!(headers.remove("X-Trace"), Some("2".to_string()));
        assert!(headers.is_empty());
    }

    #[test]
    fn authorization_formats() {
        assert_eq!(Authorization::bearer("abc").to_string(), "Bearer abc");
        assert_eq!(Authorization::token("abc").to_string(), "Token abc");
        assert_eq!(Authorization::new("Custom", "v").to_string(), "Custom v");
        // "user:pass" -> "dXNlcjpwYXNz"
        assert_eq!(
            Authorization::basic("user", "pass").to_string(),
            "Basic dXNlcjpwYXNz"
        );
    }

    #[test]
    fn merge_always_sets_cache_control() {
        let config = ClientConfig::new("https://api.example.com");
        let headers = merge_headers(&config, "", None);

        assert_eq!(headers.get("Cache-Control"), Some("no-cache"));
        assert!(!headers.contains("Content-Type"));
        assert!(!headers.contains("Authorization"));
        assert!(!headers.contains("Cookie"));
    }

    #[test]
    fn merge_synthesized_headers_beat_fixed_headers() {
        let mut config = ClientConfig::new("https://api.example.com");
        config
            .add_header("Cache-Control", "max-age=60")
            .add_header("Authorization", "Fixed nope")
            .set_bearer_auth("tok");

        let headers = merge_headers(&config, "application/json", None);

        assert_eq!(headers.get("cache-control"), Some("no-cache"));
        assert_eq!(headers.get("content-type"), Some("application/json"));
        assert_eq!(headers.get("authorization"), Some("Bearer tok"));
    }

    #[test]
    fn merge_overrides_win() {
        let mut config = ClientConfig::new("https://api.example.com");
        config
            .add_header("X", "1")
            .set_content_type("application/json")
            .set_cookie("session", "s1");

        let overrides: HeaderSet = [("x", "2"), ("content-type", "text/plain"), ("Cookie", "a=b")]
            .into_iter()
            .collect();
        let headers = merge_headers(&config, "application/json", Some(&overrides));

        assert_eq!(headers.get("X"), Some("2"));
        assert_eq!(headers.get("Content-Type"), Some("text/plain"));
        assert_eq!(headers.get("Cookie"), Some("a=b"));
    }

    #[test]
    fn merge_serializes_cookies() {
        let mut config = ClientConfig::new("https://api.example.com");
        config.set_cookie("a", "1").set_cookie("b", "2");

        let headers = merge_headers(&config, "", None);

        assert_eq!(headers.get("cookie"), Some("a=1; b=2"));
    }
}
