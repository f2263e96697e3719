//! Client-side cookie accumulation.

/// Cookies sent with every request as a single `Cookie` header.
///
/// Insertion order is kept; setting an existing name replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieStore {
    cookies: Vec<(String, String)>,
}

impl CookieStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a cookie.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.cookies.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.cookies.push((name, value)),
        }
    }

    /// Removes a cookie, returning its value.
    pub fn delete(&mut self, name: &str) -> Option<String> {
        let index = self.cookies.iter().position(|(key, _)| key == name)?;
        Some(self.cookies.remove(index).1)
    }

    /// Removes every cookie.
    pub fn reset(&mut self) {
        self.cookies.clear();
    }

    /// Single cookie value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` if no cookie is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// The `Cookie` header value: `name=value` pairs joined by `; `.
    #[must_use]
    pub fn serialize(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
