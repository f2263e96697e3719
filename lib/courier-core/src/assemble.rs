//! Request assembly and response routing.
//!
//! [`assemble`] turns standing configuration plus a per-call [`RequestSpec`]
//! into a wire request. It is synchronous and only borrows the configuration,
//! so a verb call reads its configuration exactly once, before any await.
//! [`dispatch`] then sends the request and either decodes the response or
//! writes it to storage.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::debug;
use url::Url;

use crate::{
    Body, BodySink, ClientConfig, ContentType, Decoded, HeaderSet, HttpClient, Method, QueryMap,
    Request, ResponseResult, Result, join_url, merge_headers, merge_path_query, serialize_body,
};

/// Everything a single call supplies on top of the standing configuration.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    method: Method,
    path: String,
    query: QueryMap,
    body: Option<Body>,
    headers: Option<HeaderSet>,
    output: Option<PathBuf>,
}

impl RequestSpec {
    /// Spec for `method` on `path`; the path may carry its own query.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: QueryMap::new(),
            body: None,
            headers: None,
            output: None,
        }
    }

    /// Add an explicit query parameter.
    ///
    /// Only `GET` uses the explicit query; it wins over the same key in the
    /// path's own query.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key, value);
        self
    }

    /// Add several explicit query parameters.
    #[must_use]
    pub fn queries<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in pairs {
            self.query.insert(key, value);
        }
        self
    }

    /// Set the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Add a one-time header override.
    #[must_use]
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HeaderSet::new)
            .insert(name, value);
        self
    }

    /// Add several one-time header overrides.
    #[must_use]
    pub fn headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        self.headers.get_or_insert_with(HeaderSet::new).extend(headers);
        self
    }

    /// Stream the response body to `destination` instead of decoding it.
    #[must_use]
    pub fn output(mut self, destination: impl Into<PathBuf>) -> Self {
        self.output = Some(destination.into());
        self
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Path as given.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Output destination, if any.
    #[must_use]
    pub fn destination(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

/// An assembled request and where its response goes.
#[derive(Debug, Clone)]
pub struct Assembled {
    request: Request<Bytes>,
    output: Option<PathBuf>,
}

impl Assembled {
    /// The wire request.
    #[must_use]
    pub fn request(&self) -> &Request<Bytes> {
        &self.request
    }

    /// Output destination, if the response is streamed to storage.
    #[must_use]
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

/// Build the wire request for `spec` from `config`.
///
/// # Errors
///
/// Returns an error if the path's query cannot be parsed, the joined URL is
/// invalid, or the body cannot be serialized.
pub fn assemble(config: &ClientConfig, spec: RequestSpec) -> Result<Assembled> {
    let RequestSpec {
        method,
        path,
        query,
        body,
        headers: overrides,
        output,
    } = spec;

    let path = if method.merges_inline_query() {
        merge_path_query(&path, &query)?
    } else {
        path
    };
    let url = Url::parse(&join_url(config.base_url(), &path))?;

    let tag = config.content_type();
    let content_type = match (&body, ContentType::from_tag(tag)) {
        (Some(Body::Multipart(form)), Some(ContentType::Multipart)) => form.content_type(),
        _ => tag.to_string(),
    };
    let headers = merge_headers(config, &content_type, overrides.as_ref());
    let body = body.map(|body| serialize_body(body, tag)).transpose()?;

    debug!(
        %method,
        %url,
        body_len = body.as_ref().map_or(0, Bytes::len),
        streamed = output.is_some(),
        "assembled request"
    );

    let request = Request::builder(method, url)
        .headers(headers)
        .maybe_body(body)
        .build();
    Ok(Assembled { request, output })
}

/// Send an assembled request and route its response.
///
/// Without an output destination the body goes through the decoding cascade.
/// With one, the body is written to `sink` and nothing is decoded.
///
/// # Errors
///
/// Returns transport errors unchanged, and storage errors in streaming mode.
/// Decoding never fails.
pub async fn dispatch<C, S>(
    transport: &C,
    sink: &S,
    assembled: Assembled,
) -> Result<ResponseResult>
where
    C: HttpClient,
    S: BodySink,
{
    let Assembled { request, output } = assembled;
    let response = transport.execute(request).await?;
    let (url, status, headers, body) = response.into_parts();

    match output {
        Some(destination) => {
            let written = sink.write(body, &destination).await?;
            debug!(status, written, destination = %destination.display(), "response streamed to storage");
            Ok(ResponseResult::streamed(url, status, headers, written))
        }
        None => {
            let decoded = Decoded::from_stream(body).await;
            Ok(ResponseResult::decoded(url, status, headers, decoded))
        }
    }
}
