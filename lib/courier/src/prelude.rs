//! Commonly used types, for glob importing:
//!
//! ```
//! use courier::prelude::*;
//! ```

pub use crate::{
    Body, ContentType, Error, Form, HttpClient, HyperClient, Part, RequestSpec, ResponseResult,
    RestClient, Result, StatusCode,
};
pub use serde::{Deserialize, Serialize};
