//! Core types and the request/response pipeline for the courier HTTP client.
//!
//! This crate holds everything that does not touch the network:
//! - [`ClientConfig`] - standing configuration (base URL, content type,
//!   headers, authorization, cookies)
//! - [`RequestSpec`], [`assemble`] and [`dispatch`] - turning a call into a
//!   wire [`Request`] and routing the response
//! - [`join_url`], [`merge_path_query`], [`merge_headers`], [`serialize_body`] -
//!   the individual assembly steps
//! - [`Decoded`] and [`FlagExtractor`] - the response decoding cascade
//! - [`ResponseResult`] - what a call returns
//! - [`HttpClient`] and [`BodySink`] - the transport and storage seams
//! - [`Error`] and [`Result`] - error handling
//! - [`StatusCode`] and [`header`] - re-exported from the `http` crate

mod assemble;
mod body;
mod client;
mod config;
mod cookie;
mod decode;
mod error;
mod headers;
mod method;
mod multipart;
pub mod prelude;
mod query;
mod request;
mod response;
mod url_join;

pub use assemble::{Assembled, RequestSpec, assemble, dispatch};
pub use body::{Body, ContentType, serialize_body, to_form};
pub use client::{BodySink, HttpClient};
pub use config::ClientConfig;
pub use cookie::CookieStore;
pub use decode::{Decoded, FlagExtractor};
pub use error::{Error, Result};
pub use headers::{Authorization, HeaderSet, merge_headers};
pub use method::Method;
pub use multipart::{Form, Part};
pub use query::QueryMap;
pub use request::{Request, RequestBuilder};
pub use response::{ResponseResult, StreamingBody, StreamingResponse, status_text};
pub use url_join::{join_url, merge_path_query};

pub use http::{StatusCode, header};
