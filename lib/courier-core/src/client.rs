//! Collaborator traits.
//!
//! - [`HttpClient`] - the network transport
//! - [`BodySink`] - where a response body goes when it is not decoded

use std::future::Future;
use std::path::Path;

use bytes::Bytes;

use crate::{Request, Result, StreamingBody, StreamingResponse};

/// Network transport.
///
/// Sends a fully assembled request and returns the status, headers and body
/// stream. Failures (DNS, connection, TLS, timeout) are returned as errors and
/// propagate unmodified to the caller of a verb method.
///
/// # Example
///
/// ```ignore
/// use courier_core::{HttpClient, Request, Result, StreamingResponse};
/// use bytes::Bytes;
///
/// #[derive(Clone)]
/// struct Canned;
///
/// impl HttpClient for Canned {
///     async fn execute(&self, request: Request<Bytes>) -> Result<StreamingResponse> {
///         let (_, url, _, _) = request.into_parts();
///         Ok(StreamingResponse::buffered(url, 200, Default::default(), Bytes::from("ok")))
///     }
/// }
/// ```
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the streaming response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails for any reason:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<StreamingResponse>> + Send;
}

/// Storage for response bodies that bypass decoding.
pub trait BodySink: Send + Sync {
    /// Write the whole body stream to `destination`, returning the number of
    /// bytes written once the destination signals completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream fails or the destination cannot be written.
    fn write(
        &self,
        body: StreamingBody,
        destination: &Path,
    ) -> impl Future<Output = Result<u64>> + Send;
}
