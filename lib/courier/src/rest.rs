//! The caller-facing REST client.

use std::future::{Future, IntoFuture};
use std::path::PathBuf;
use std::pin::Pin;

use serde::Serialize;

use crate::{
    Authorization, Body, BodySink, ClientConfig, CookieStore, FileSink, HeaderSet, HttpClient,
    HyperClient, Method, RequestSpec, ResponseResult, Result, assemble, dispatch,
};

/// Future returned by awaiting a call builder.
pub type CallFuture<'a> = Pin<Box<dyn Future<Output = Result<ResponseResult>> + Send + 'a>>;

/// A REST client: standing configuration plus a transport and a body sink.
///
/// Configuration mutators take `&mut self`; verb calls borrow the client
/// immutably and assemble their request as soon as they are sent, so a call in
/// flight always carries the configuration it was issued with.
///
/// # Example
///
/// ```no_run
/// use courier::{ContentType, RestClient};
///
/// # async fn run() -> courier::Result<()> {
/// let mut client = RestClient::new("https://ctf.example.com/api/");
/// client
///     .set_content_type(ContentType::Json)
///     .set_bearer_auth("secret")
///     .set_cookie("session", "abc");
///
/// let result = client.get("/challenge").query("level", "3").await?;
/// if result.ok() {
///     println!("{}", result.flag("FLAG"));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RestClient<C = HyperClient, S = FileSink> {
    config: ClientConfig,
    transport: C,
    sink: S,
}

impl RestClient {
    /// Client for `base_url` over the default [`HyperClient`] transport.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_transport(HyperClient::new(), base_url)
    }
}

impl<C> RestClient<C> {
    /// Client for `base_url` over a custom transport, storing streamed bodies
    /// on the local filesystem.
    #[must_use]
    pub fn with_transport(transport: C, base_url: impl Into<String>) -> Self {
        Self {
            config: ClientConfig::new(base_url),
            transport,
            sink: FileSink,
        }
    }
}

impl<C, S> RestClient<C, S> {
    /// Replace where streamed response bodies are written.
    #[must_use]
    pub fn with_sink<T>(self, sink: T) -> RestClient<C, T> {
        RestClient {
            config: self.config,
            transport: self.transport,
            sink,
        }
    }

    /// Standing configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Mutable access to the standing configuration.
    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    /// Frozen copy of the current configuration.
    #[must_use]
    pub fn snapshot(&self) -> ClientConfig {
        self.config.clone()
    }

    /// The transport.
    #[must_use]
    pub fn transport(&self) -> &C {
        &self.transport
    }

    /// Base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    /// Set the base URL.
    pub fn set_base_url(&mut self, base_url: impl Into<String>) -> &mut Self {
        self.config.set_base_url(base_url);
        self
    }

    /// Content-type tag; empty when unset.
    #[must_use]
    pub fn content_type(&self) -> &str {
        self.config.content_type()
    }

    /// Set the content-type tag. An empty tag unsets it.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.config.set_content_type(content_type);
        self
    }

    /// Fixed headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderSet {
        self.config.headers()
    }

    /// Add or overwrite a fixed header.
    pub fn add_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> &mut Self {
        self.config.add_header(name, value);
        self
    }

    /// Remove a fixed header.
    pub fn delete_header(&mut self, name: &str) -> &mut Self {
        self.config.delete_header(name);
        self
    }

    /// Replace every fixed header.
    pub fn replace_headers(&mut self, headers: impl Into<HeaderSet>) -> &mut Self {
        self.config.replace_headers(headers);
        self
    }

    /// Remove every fixed header.
    pub fn reset_headers(&mut self) -> &mut Self {
        self.config.reset_headers();
        self
    }

    /// Authorization, if set.
    #[must_use]
    pub fn authorization(&self) -> Option<&Authorization> {
        self.config.authorization()
    }

    /// Set authorization with an arbitrary scheme.
    pub fn set_authorization(
        &mut self,
        scheme: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.config.set_authorization(scheme, value);
        self
    }

    /// Set `Basic` authorization from a username and password.
    pub fn set_basic_auth(
        &mut self,
        username: impl AsRef<str>,
        password: impl AsRef<str>,
    ) -> &mut Self {
        self.config.set_basic_auth(username, password);
        self
    }

    /// Set `Bearer` authorization.
    pub fn set_bearer_auth(&mut self, token: impl Into<String>) -> &mut Self {
        self.config.set_bearer_auth(token);
        self
    }

    /// Set `Token` authorization.
    pub fn set_token_auth(&mut self, token: impl Into<String>) -> &mut Self {
        self.config.set_token_auth(token);
        self
    }

    /// Remove authorization.
    pub fn reset_authorization(&mut self) -> &mut Self {
        self.config.reset_authorization();
        self
    }

    /// Cookie store.
    #[must_use]
    pub fn cookies(&self) -> &CookieStore {
        self.config.cookies()
    }

    /// Set a cookie.
    pub fn set_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.config.set_cookie(name, value);
        self
    }

    /// Remove a cookie.
    pub fn delete_cookie(&mut self, name: &str) -> &mut Self {
        self.config.delete_cookie(name);
        self
    }

    /// Remove every cookie.
    pub fn reset_cookies(&mut self) -> &mut Self {
        self.config.reset_cookies();
        self
    }
}

impl<C, S> RestClient<C, S>
where
    C: HttpClient,
    S: BodySink,
{
    /// Start a `GET` call.
    #[must_use]
    pub fn get(&self, path: impl Into<String>) -> GetCall<'_, C, S> {
        GetCall {
            client: self,
            spec: RequestSpec::new(Method::Get, path),
        }
    }

    /// Start a `POST` call.
    #[must_use]
    pub fn post(&self, path: impl Into<String>) -> BodyCall<'_, C, S> {
        self.body_call(Method::Post, path)
    }

    /// Start a `PUT` call.
    #[must_use]
    pub fn put(&self, path: impl Into<String>) -> BodyCall<'_, C, S> {
        self.body_call(Method::Put, path)
    }

    /// Start a `PATCH` call.
    #[must_use]
    pub fn patch(&self, path: impl Into<String>) -> BodyCall<'_, C, S> {
        self.body_call(Method::Patch, path)
    }

    /// Start a `DELETE` call.
    #[must_use]
    pub fn delete(&self, path: impl Into<String>) -> BodyCall<'_, C, S> {
        self.body_call(Method::Delete, path)
    }

    fn body_call(&self, method: Method, path: impl Into<String>) -> BodyCall<'_, C, S> {
        BodyCall {
            client: self,
            spec: RequestSpec::new(method, path),
        }
    }

    /// Issue a fully described call.
    ///
    /// The request is assembled before this returns; only the transport call
    /// and, in streaming mode, the storage write happen when the future runs.
    pub fn execute(&self, spec: RequestSpec) -> impl Future<Output = Result<ResponseResult>> + Send + '_ {
        let assembled = assemble(&self.config, spec);
        async move { dispatch(&self.transport, &self.sink, assembled?).await }
    }
}

/// Builder for a `GET` call. Await it, or call [`send`](Self::send).
#[derive(Debug)]
#[must_use = "a call does nothing until it is sent"]
pub struct GetCall<'a, C, S> {
    client: &'a RestClient<C, S>,
    spec: RequestSpec,
}

impl<'a, C, S> GetCall<'a, C, S>
where
    C: HttpClient,
    S: BodySink,
{
    /// Add a query parameter; it wins over the same key in the path's query.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.spec = self.spec.query(key, value);
        self
    }

    /// Add several query parameters.
    pub fn queries<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.spec = self.spec.queries(pairs);
        self
    }

    /// Add a one-time header override.
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.spec = self.spec.header(name, value);
        self
    }

    /// Add several one-time header overrides.
    pub fn headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        self.spec = self.spec.headers(headers);
        self
    }

    /// Write the response body to `destination` instead of decoding it.
    pub fn output(mut self, destination: impl Into<PathBuf>) -> Self {
        self.spec = self.spec.output(destination);
        self
    }

    /// Assemble the request now and return the future that sends it.
    pub fn send(self) -> impl Future<Output = Result<ResponseResult>> + Send + 'a {
        self.client.execute(self.spec)
    }
}

impl<'a, C, S> IntoFuture for GetCall<'a, C, S>
where
    C: HttpClient,
    S: BodySink,
{
    type Output = Result<ResponseResult>;
    type IntoFuture = CallFuture<'a>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.send())
    }
}

/// Builder for a `POST`, `PUT`, `PATCH` or `DELETE` call. Await it, or call
/// [`send`](Self::send).
#[derive(Debug)]
#[must_use = "a call does nothing until it is sent"]
pub struct BodyCall<'a, C, S> {
    client: &'a RestClient<C, S>,
    spec: RequestSpec,
}

impl<'a, C, S> BodyCall<'a, C, S>
where
    C: HttpClient,
    S: BodySink,
{
    /// Set the body: a string is sent as-is, a structured value is serialized
    /// according to the content-type tag.
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.spec = self.spec.body(body);
        self
    }

    /// Set a structured body from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be converted to a JSON value.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        self.spec = self.spec.body(Body::json(value)?);
        Ok(self)
    }

    /// Add a one-time header override.
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.spec = self.spec.header(name, value);
        self
    }

    /// Add several one-time header overrides.
    pub fn headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        self.spec = self.spec.headers(headers);
        self
    }

    /// Assemble the request now and return the future that sends it.
    pub fn send(self) -> impl Future<Output = Result<ResponseResult>> + Send + 'a {
        self.client.execute(self.spec)
    }
}

impl<'a, C, S> IntoFuture for BodyCall<'a, C, S>
where
    C: HttpClient,
    S: BodySink,
{
    type Output = Result<ResponseResult>;
    type IntoFuture = CallFuture<'a>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.send())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use assert2::{check, let_assert};
    use bytes::Bytes;
    use serde_json::json;

    use super::*;
    use crate::{ContentType, Request, StreamingResponse};

    #[derive(Clone, Default)]
    struct Recorder {
        requests: Arc<Mutex<Vec<Request<Bytes>>>>,
    }

    impl Recorder {
        fn last(&self) -> Request<Bytes> {
            self.requests
                .lock()
                .expect("lock")
                .last()
                .cloned()
                .expect("a request was sent")
        }
    }

    impl HttpClient for Recorder {
        async fn execute(&self, request: Request<Bytes>) -> Result<StreamingResponse> {
            let url = request.url().clone();
            self.requests.lock().expect("lock").push(request);
            Ok(StreamingResponse::buffered(
                url,
                200,
                HeaderSet::new(),
                Bytes::from("FLAG{recorded}"),
            ))
        }
    }

    fn client() -> RestClient<Recorder> {
        RestClient::with_transport(Recorder::default(), "https://api.example.com/")
    }

    #[tokio::test]
    async fn standing_configuration_reaches_the_request() {
        let mut client = client();
        client
            .set_content_type(ContentType::Json)
            .set_bearer_auth("t0k3n")
            .set_cookie("session", "abc")
            .set_cookie("theme", "dark")
            .add_header("X-Team", "red");

        let result = client.get("/status").await.expect("call");
        check!(result.flag("FLAG") == "FLAG{recorded}");

        let request = client.transport().last();
        check!(request.url().as_str() == "https://api.example.com/status");
        check!(request.header("authorization") == Some("Bearer t0k3n"));
        check!(request.header("cookie") == Some("session=abc; theme=dark"));
        check!(request.header("x-team") == Some("red"));
        check!(request.header("cache-control") == Some("no-cache"));
        check!(request.header("content-type") == Some("application/json"));
    }

    #[tokio::test]
    async fn reset_removes_standing_configuration() {
        let mut client = client();
        client
            .set_basic_auth("user", "pass")
            .set_cookie("a", "1")
            .add_header("X-Gone", "1");
        client
            .reset_authorization()
            .reset_cookies()
            .reset_headers()
            .set_content_type("");

        client.delete("/items/1").await.expect("call");

        let request = client.transport().last();
        check!(request.header("authorization").is_none());
        check!(request.header("cookie").is_none());
        check!(request.header("x-gone").is_none());
        check!(request.header("content-type").is_none());
        check!(request.header("cache-control") == Some("no-cache"));
    }

    #[tokio::test]
    async fn post_serializes_json_body() {
        let mut client = client();
        client.set_content_type(ContentType::Json);

        client
            .post("/users")
            .json(&json!({"name": "jane", "admin": false}))
            .expect("json body")
            .await
            .expect("call");

        let request = client.transport().last();
        check!(request.method() == Method::Post);
        let_assert!(Some(body) = request.body());
        check!(body.as_ref() == br#"{"name":"jane","admin":false}"#.as_slice());
    }

    #[tokio::test]
    async fn patch_with_string_body_passes_through() {
        let mut client = client();
        client.set_content_type(ContentType::FormUrlEncoded);

        client
            .patch("/users/1")
            .body("raw=payload&keep=as-is")
            .header("X-Trace", "1")
            .await
            .expect("call");

        let request = client.transport().last();
        check!(request.body().map(Bytes::as_ref) == Some(b"raw=payload&keep=as-is".as_slice()));
        check!(request.header("x-trace") == Some("1"));
    }

    #[tokio::test]
    async fn get_merges_query_and_other_verbs_do_not() {
        let client = client();

        client
            .get("/search?q=old&page=1")
            .query("q", "new")
            .await
            .expect("get");
        check!(
            client.transport().last().url().as_str()
                == "https://api.example.com/search?q=new&page=1"
        );

        client.put("/search?q=old").await.expect("put");
        check!(client.transport().last().url().as_str() == "https://api.example.com/search?q=old");
    }

    #[tokio::test]
    async fn call_keeps_configuration_it_was_sent_with() {
        let mut client = client();
        client.add_header("X-Version", "1");

        let pending = client.get("/a").send();
        let result = pending.await.expect("call");
        check!(result.ok());
        check!(client.transport().last().header("x-version") == Some("1"));

        client.add_header("X-Version", "2");
        client.get("/b").await.expect("call");
        check!(client.transport().last().header("x-version") == Some("2"));
    }

    #[test]
    fn snapshot_is_independent() {
        let mut client = client();
        client.set_token_auth("one");
        let snapshot = client.snapshot();
        client.set_token_auth("two");

        let_assert!(Some(auth) = snapshot.authorization());
        check!(auth.to_string() == "Token one");
        let_assert!(Some(auth) = client.authorization());
        check!(auth.to_string() == "Token two");
    }

    #[test]
    fn configuration_getters() {
        let mut client = client();
        client
            .set_base_url("https://other.example.com")
            .replace_headers([("A", "1"), ("B", "2")].into_iter().collect::<HeaderSet>())
            .delete_header("a");

        check!(client.base_url() == "https://other.example.com");
        check!(client.headers().len() == 1);
        check!(client.content_type() == "");
        check!(client.cookies().is_empty());
    }
}
