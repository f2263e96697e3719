//! Response decompression middleware.
//!
//! Adds `Accept-Encoding` to requests that do not set it. A response with a
//! `Content-Encoding` of `gzip`, `deflate`, `br` or `zstd` is buffered,
//! decoded, and handed on as a single-chunk body without the encoding header.
//! A read or decode failure is surfaced through the body stream, so it reaches
//! the decoder or the storage writer like any other body failure.

use std::future::Future;
use std::io::Read;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use tower::{Layer, Service};
use tracing::debug;

use crate::{Error, Request, Result, StreamingBody, StreamingResponse};

const ACCEPT_ENCODING: &str = "gzip, deflate, br, zstd";

/// Layer that enables response decompression.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecompressionLayer {
    _private: (),
}

impl DecompressionLayer {
    /// Create a new decompression layer.
    #[must_use]
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl<S> Layer<S> for DecompressionLayer {
    type Service = Decompression<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Decompression { inner }
    }
}

/// Service that decompresses response bodies.
#[derive(Debug, Clone)]
pub struct Decompression<S> {
    inner: S,
}

impl<S> Decompression<S> {
    /// Wrap `inner`.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

fn is_supported(encoding: &str) -> bool {
    matches!(encoding, "gzip" | "x-gzip" | "deflate" | "br" | "zstd")
}

fn decompress(encoding: &str, body: &[u8]) -> Result<Bytes> {
    let mut decompressed = Vec::new();
    match encoding {
        "gzip" | "x-gzip" => {
            flate2::read::GzDecoder::new(body)
                .read_to_end(&mut decompressed)
                .map_err(|err| Error::stream(format!("gzip decompression failed: {err}")))?;
        }
        "deflate" => {
            flate2::read::DeflateDecoder::new(body)
                .read_to_end(&mut decompressed)
                .map_err(|err| Error::stream(format!("deflate decompression failed: {err}")))?;
        }
        "br" => {
            brotli::BrotliDecompress(&mut &body[..], &mut decompressed)
                .map_err(|err| Error::stream(format!("brotli decompression failed: {err}")))?;
        }
        "zstd" => {
            decompressed = zstd::decode_all(body)
                .map_err(|err| Error::stream(format!("zstd decompression failed: {err}")))?;
        }
        _ => return Ok(Bytes::copy_from_slice(body)),
    }
    Ok(Bytes::from(decompressed))
}

async fn decompress_body(encoding: &str, mut body: StreamingBody) -> Result<Bytes> {
    let mut compressed = BytesMut::new();
    while let Some(chunk) = body.next().await {
        compressed.extend_from_slice(&chunk?);
    }
    let decompressed = decompress(encoding, &compressed)?;
    debug!(
        encoding,
        compressed = compressed.len(),
        decompressed = decompressed.len(),
        "response body decompressed"
    );
    Ok(decompressed)
}

impl<S> Service<Request<Bytes>> for Decompression<S>
where
    S: Service<Request<Bytes>, Response = StreamingResponse, Error = Error>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = StreamingResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let request = if request.headers().contains("accept-encoding") {
            request
        } else {
            let (method, url, mut headers, body) = request.into_parts();
            headers.insert("accept-encoding", ACCEPT_ENCODING);
            Request::from_parts(method, url, headers, body)
        };

        // The ready service goes into the future; a fresh clone stays behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let response = inner.call(request).await?;

            let encoding = response
                .headers()
                .get("content-encoding")
                .map(|value| value.trim().to_ascii_lowercase())
                .unwrap_or_default();
            if !is_supported(&encoding) {
                return Ok(response);
            }

            let (url, status, mut headers, body) = response.into_parts();
            headers.remove("content-encoding");
            headers.remove("content-length");

            let body: StreamingBody = match decompress_body(&encoding, body).await {
                Ok(decompressed) => {
                    headers.insert("content-length", decompressed.len().to_string());
                    Box::pin(futures_util::stream::once(async move { Ok(decompressed) }))
                }
                Err(err) => Box::pin(futures_util::stream::once(async move { Err(err) })),
            };

            Ok(StreamingResponse::new(url, status, headers, body))
        })
    }
}
