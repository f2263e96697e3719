//! A configurable REST client.
//!
//! [`RestClient`] keeps standing configuration (base URL, content type, fixed
//! headers, authorization, cookies) and issues `GET`, `POST`, `PUT`, `PATCH`
//! and `DELETE` calls against it. Each call merges one-time header overrides
//! over the standing configuration, serializes its body according to the
//! content type, and returns a [`ResponseResult`] whose decoded views (bytes,
//! text, JSON, form data, flag extraction) are each independently optional.
//! A `GET` call can instead stream its response body straight to a file.
//!
//! # Example
//!
//! ```no_run
//! use courier::prelude::*;
//!
//! # async fn run() -> courier::Result<()> {
//! let mut client = RestClient::new("https://ctf.example.com/");
//! client.set_content_type(ContentType::FormUrlEncoded);
//!
//! let login = client
//!     .post("/login")
//!     .json(&serde_json::json!({"user": "jane", "password": "hunter2"}))?
//!     .await?;
//!
//! if let Some(form) = login.form_data() {
//!     println!("token: {:?}", form.get("token"));
//! }
//!
//! client.get("/dump").output("dump.bin").await?;
//! # Ok(())
//! # }
//! ```
//!
//! The transport is a [`HyperClient`] (hyper-util with rustls); any
//! [`HttpClient`] implementation can take its place through
//! [`RestClient::with_transport`].

mod client;
mod config;
mod connector;
pub mod middleware;
pub mod prelude;
mod rest;
mod storage;

pub use client::{BoxedService, HyperClient, HyperClientBuilder, ServiceFuture};
pub use config::{TransportConfig, TransportConfigBuilder};
pub use rest::{BodyCall, CallFuture, GetCall, RestClient};
pub use storage::{FileSink, write_to_file};

// Re-export tower for middleware composition
pub use tower;

pub use courier_core::{
    Assembled, Authorization, Body, BodySink, ClientConfig, ContentType, CookieStore, Decoded,
    Error, FlagExtractor, Form, HeaderSet, HttpClient, Method, Part, QueryMap, Request,
    RequestBuilder, RequestSpec, ResponseResult, Result, StreamingBody, StreamingResponse,
    assemble, dispatch, join_url, merge_headers, merge_path_query, serialize_body, status_text,
    to_form,
};

pub use courier_core::{StatusCode, header};

pub use url;
