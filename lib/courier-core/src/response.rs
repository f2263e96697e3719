//! HTTP responses.
//!
//! - [`StreamingResponse`] is what a transport returns: status, headers and a
//!   body stream.
//! - [`ResponseResult`] is what callers get back: transport metadata plus
//!   either the decoded body or, when the body was written to storage,
//!   nothing decoded at all.

use std::pin::Pin;

use bytes::Bytes;
use futures_core::Stream;
use serde_json::Value;
use url::Url;

use crate::{Decoded, FlagExtractor, HeaderSet};

/// A streaming body: chunks of bytes arriving over time.
pub type StreamingBody = Pin<Box<dyn Stream<Item = crate::Result<Bytes>> + Send>>;

/// HTTP response with a streaming body, as produced by a transport.
pub struct StreamingResponse {
    url: Url,
    status: u16,
    headers: HeaderSet,
    body: StreamingBody,
}

impl std::fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("url", &self.url.as_str())
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl StreamingResponse {
    /// Creates a new streaming response.
    #[must_use]
    pub fn new(url: Url, status: u16, headers: HeaderSet, body: StreamingBody) -> Self {
        Self {
            url,
            status,
            headers,
            body,
        }
    }

    /// Response whose whole body is already in memory.
    #[must_use]
    pub fn buffered(url: Url, status: u16, headers: HeaderSet, body: Bytes) -> Self {
        let body: StreamingBody = Box::pin(futures_util::stream::once(async move { Ok(body) }));
        Self::new(url, status, headers, body)
    }

    /// Final URL of the response.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Consume into (url, status, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Url, u16, HeaderSet, StreamingBody) {
        (self.url, self.status, self.headers, self.body)
    }
}

/// Canonical reason phrase for a status code, or an empty string.
#[must_use]
pub fn status_text(status: u16) -> String {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or_default()
        .to_string()
}

#[derive(Debug, Clone, PartialEq)]
enum Content {
    Decoded(Decoded),
    Streamed { bytes_written: u64 },
}

/// The outcome of one request.
///
/// `ok` and `status` describe the transport outcome only. Each decoded view
/// is independently optional and must be checked on its own. When the body was
/// streamed to storage every decoded view is `None` and [`flag`](Self::flag)
/// always returns an empty string.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseResult {
    url: Url,
    status: u16,
    status_text: String,
    headers: HeaderSet,
    content: Content,
}

impl ResponseResult {
    /// Result carrying a decoded body.
    #[must_use]
    pub fn decoded(url: Url, status: u16, headers: HeaderSet, decoded: Decoded) -> Self {
        Self {
            url,
            status,
            status_text: status_text(status),
            headers,
            content: Content::Decoded(decoded),
        }
    }

    /// Result for a body written to storage.
    #[must_use]
    pub fn streamed(url: Url, status: u16, headers: HeaderSet, bytes_written: u64) -> Self {
        Self {
            url,
            status,
            status_text: status_text(status),
            headers,
            content: Content::Streamed { bytes_written },
        }
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Final URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Reason phrase for the status code.
    #[must_use]
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// Single header value by name, case-insensitive.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Returns `true` if the body was written to storage instead of decoded.
    #[must_use]
    pub const fn is_streamed(&self) -> bool {
        matches!(self.content, Content::Streamed { .. })
    }

    /// Number of bytes written to storage, in streaming mode.
    #[must_use]
    pub const fn bytes_written(&self) -> Option<u64> {
        match self.content {
            Content::Streamed { bytes_written } => Some(bytes_written),
            Content::Decoded(_) => None,
        }
    }

    fn decoded_body(&self) -> Option<&Decoded> {
        match &self.content {
            Content::Decoded(decoded) => Some(decoded),
            Content::Streamed { .. } => None,
        }
    }

    /// Raw body bytes.
    #[must_use]
    pub fn bytes(&self) -> Option<&Bytes> {
        self.decoded_body().and_then(Decoded::bytes)
    }

    /// Body as text.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.decoded_body().and_then(Decoded::text)
    }

    /// Body as JSON.
    #[must_use]
    pub fn json(&self) -> Option<&Value> {
        self.decoded_body().and_then(Decoded::json)
    }

    /// Body as form data.
    #[must_use]
    pub fn form_data(&self) -> Option<&std::collections::HashMap<String, String>> {
        self.decoded_body().and_then(Decoded::form_data)
    }

    /// Typed view of the JSON body; `None` if absent or of another shape.
    #[must_use]
    pub fn json_as<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        self.json()
            .and_then(|value| T::deserialize(value).ok())
    }

    /// Flag extractor over the body text.
    #[must_use]
    pub fn flag_extractor(&self) -> FlagExtractor<'_> {
        FlagExtractor::new(self.text())
    }

    /// First `prefix{...}` token in the body text, or an empty string.
    #[must_use]
    pub fn flag(&self, prefix: &str) -> String {
        self.flag_extractor().extract(prefix)
    }
}
