//! Tower middleware layers for the courier transport.
//!
//! Layers wrap [`HyperClient`](crate::HyperClient) through
//! [`HyperClientBuilder::layer`](crate::HyperClientBuilder::layer); the last
//! layer added is the first to see a request.
//!
//! - [`LoggingLayer`] - logs requests and outcomes using `tracing`
//! - [`DecompressionLayer`] - decodes `gzip`, `deflate`, `br` and `zstd`
//!   bodies (feature `middleware-decompression`)
//! - [`ConcurrencyLimitLayer`] - limits requests in flight (from `tower`)
//!
//! # Example
//!
//! ```no_run
//! use courier::HyperClient;
//! use courier::middleware::{ConcurrencyLimitLayer, LoggingLayer};
//!
//! let client = HyperClient::builder()
//!     .layer(ConcurrencyLimitLayer::new(8))
//!     .layer(LoggingLayer::debug())
//!     .build();
//! ```

#[cfg(feature = "middleware-decompression")]
mod decompression;
mod logging;

#[cfg(feature = "middleware-decompression")]
pub use decompression::{Decompression, DecompressionLayer};
pub use logging::{LogLevel, Logging, LoggingLayer};

pub use tower::limit::ConcurrencyLimitLayer;
pub use tower::{Layer, ServiceBuilder};
