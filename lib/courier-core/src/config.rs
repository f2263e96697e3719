//! Standing client configuration.

use crate::{Authorization, CookieStore, HeaderSet};

/// Configuration applied to every request a client issues.
///
/// Mutators take `&mut self` and return `&mut Self` so they can be chained.
/// Requests are assembled from a shared borrow, so no mutation can interleave
/// with the assembly of an in-flight call; clone the configuration to freeze a
/// snapshot of it.
///
/// # Example
///
/// ```
/// use courier_core::{ClientConfig, ContentType};
///
/// let mut config = ClientConfig::new("https://api.example.com/");
/// config
///     .set_content_type(ContentType::Json)
///     .set_bearer_auth("secret")
///     .add_header("X-Client", "docs")
///     .set_cookie("session", "abc");
///
/// assert_eq!(config.content_type(), "application/json");
/// assert_eq!(config.headers().get("x-client"), Some("docs"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    content_type: String,
    authorization: Option<Authorization>,
    cookies: CookieStore,
    headers: HeaderSet,
}

impl ClientConfig {
    /// Create a configuration for the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Base URL all paths are joined to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the base URL.
    pub fn set_base_url(&mut self, base_url: impl Into<String>) -> &mut Self {
        self.base_url = base_url.into();
        self
    }

    /// Content-type tag; empty when unset.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Set the content-type tag. An empty tag unsets it.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.content_type = content_type.into();
        self
    }

    /// Fixed headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// Add a fixed header, replacing any header with the same name.
    pub fn add_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    /// Remove a fixed header.
    pub fn delete_header(&mut self, name: &str) -> &mut Self {
        self.headers.remove(name);
        self
    }

    /// Replace all fixed headers.
    pub fn replace_headers(&mut self, headers: impl Into<HeaderSet>) -> &mut Self {
        self.headers = headers.into();
        self
    }

    /// Remove all fixed headers.
    pub fn reset_headers(&mut self) -> &mut Self {
        self.headers.clear();
        self
    }

    /// Configured authorization, if any.
    #[must_use]
    pub fn authorization(&self) -> Option<&Authorization> {
        self.authorization.as_ref()
    }

    /// Set authorization with an arbitrary scheme.
    pub fn set_authorization(
        &mut self,
        scheme: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.authorization = Some(Authorization::new(scheme, value));
        self
    }

    /// Set `Basic` authorization from a username and password.
    pub fn set_basic_auth(
        &mut self,
        username: impl AsRef<str>,
        password: impl AsRef<str>,
    ) -> &mut Self {
        self.authorization = Some(Authorization::basic(username, password));
        self
    }

    /// Set `Bearer` authorization.
    pub fn set_bearer_auth(&mut self, token: impl Into<String>) -> &mut Self {
        self.authorization = Some(Authorization::bearer(token));
        self
    }

    /// Set `Token` authorization.
    pub fn set_token_auth(&mut self, token: impl Into<String>) -> &mut Self {
        self.authorization = Some(Authorization::token(token));
        self
    }

    /// Remove authorization.
    pub fn reset_authorization(&mut self) -> &mut Self {
        self.authorization = None;
        self
    }

    /// Cookie store.
    #[must_use]
    pub fn cookies(&self) -> &CookieStore {
        &self.cookies
    }

    /// Set a cookie.
    pub fn set_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.cookies.set(name, value);
        self
    }

    /// Remove a cookie.
    pub fn delete_cookie(&mut self, name: &str) -> &mut Self {
        self.cookies.delete(name);
        self
    }

    /// Remove all cookies.
    pub fn reset_cookies(&mut self) -> &mut Self {
        self.cookies.reset();
        self
    }
}
