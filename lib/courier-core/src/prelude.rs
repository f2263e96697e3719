//! Commonly used types, for glob importing:
//!
//! ```
//! use courier_core::prelude::*;
//! ```

pub use crate::{
    Body, ClientConfig, ContentType, Error, Form, HttpClient, Method, Part, Request, RequestSpec,
    ResponseResult, Result,
};
