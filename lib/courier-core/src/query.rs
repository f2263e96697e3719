//! Query string parsing and encoding.

use crate::{Error, Result};

/// An ordered query mapping.
///
/// Keys are unique: inserting an existing key replaces its value and keeps
/// its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMap {
    pairs: Vec<(String, String)>,
}

impl QueryMap {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `&`-separated list of `key=value` pairs (without the leading `?`).
    ///
    /// Percent-escapes and `+` are decoded, so re-encoding the mapping does not
    /// double-escape.
    pub fn parse(query: &str) -> Result<Self> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
            .map_err(|e| Error::invalid_request(format!("malformed query `{query}`: {e}")))?;
        Ok(pairs.into_iter().collect())
    }

    /// Sets a key, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => Some(std::mem::replace(&mut entry.1, value)),
            None => {
                self.pairs.push((key, value));
                None
            }
        }
    }

    /// Value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterates over `(key, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlays `other` key by key; `other` wins on conflict.
    pub fn merge(&mut self, other: &Self) {
        for (key, value) in &other.pairs {
            self.insert(key.clone(), value.clone());
        }
    }

    /// Encode as a query string (without the leading `?`).
    pub fn encode(&self) -> Result<String> {
        serde_urlencoded::to_string(&self.pairs).map_err(Into::into)
    }
}

impl<K, V> FromIterator<(K, V)> for QueryMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Self::new();
        for (key, value) in iter {
            query.insert(key, value);
        }
        query
    }
}
