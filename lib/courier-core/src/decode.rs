//! Response decoding cascade.
//!
//! Each stage is an independent, infallible conversion that yields `None`
//! when it cannot produce a value:
//!
//! ```text
//! body stream -> bytes -> text (lossy UTF-8) -> json
//!                              \-> form data
//! ```
//!
//! A `None` only propagates forward through its inputs: a body that is not
//! JSON still gets its form-data stage, and vice versa.

use std::collections::HashMap;

use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::StreamingBody;

/// Whole-text `key=value(&key=value)*` pattern.
#[allow(clippy::expect_used)]
static FORM_DATA_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^=&\s]+=[^&\s]*(?:&[^=&\s]+=[^&\s]*)*$").expect("form data pattern is valid")
});

/// The decoded representations of a response body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoded {
    bytes: Option<Bytes>,
    text: Option<String>,
    json: Option<Value>,
    form_data: Option<HashMap<String, String>>,
}

impl Decoded {
    /// Read a body stream to the end and decode it.
    ///
    /// A failure while reading is logged and leaves every stage empty.
    pub async fn from_stream(body: StreamingBody) -> Self {
        Self::from_bytes(read_body(body).await)
    }

    /// Decode an already buffered body.
    #[must_use]
    pub fn from_bytes(bytes: Option<Bytes>) -> Self {
        let text = bytes
            .as_deref()
            .map(|raw| String::from_utf8_lossy(raw).into_owned());
        let json = text.as_deref().and_then(parse_json);
        let form_data = text.as_deref().and_then(parse_form_data);

        Self {
            bytes,
            text,
            json,
            form_data,
        }
    }

    /// Raw body bytes.
    #[must_use]
    pub fn bytes(&self) -> Option<&Bytes> {
        self.bytes.as_ref()
    }

    /// Body as UTF-8 text, invalid sequences replaced.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Body parsed as JSON.
    #[must_use]
    pub fn json(&self) -> Option<&Value> {
        self.json.as_ref()
    }

    /// Body parsed as `key=value&...` form data.
    #[must_use]
    pub fn form_data(&self) -> Option<&HashMap<String, String>> {
        self.form_data.as_ref()
    }
}

async fn read_body(mut body: StreamingBody) -> Option<Bytes> {
    let mut collected = BytesMut::new();
    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(chunk) => collected.extend_from_slice(&chunk),
            Err(err) => {
                warn!(error = %err, "failed to read response body");
                return None;
            }
        }
    }
    Some(collected.freeze())
}

fn parse_json(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

fn parse_form_data(text: &str) -> Option<HashMap<String, String>> {
    if !FORM_DATA_REGEX.is_match(text) {
        return None;
    }

    let fields = text
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    Some(fields)
}

/// Finds `PREFIX{...}` tokens in decoded response text.
///
/// # Example
///
/// ```
/// use courier_core::FlagExtractor;
///
/// let extractor = FlagExtractor::new(Some("you found FLAG{abc123}!"));
/// assert_eq!(extractor.extract("FLAG"), "FLAG{abc123}");
/// assert_eq!(extractor.extract("CTF"), "");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FlagExtractor<'a> {
    text: Option<&'a str>,
}

impl<'a> FlagExtractor<'a> {
    /// Extractor over `text`; `None` makes every extraction empty.
    #[must_use]
    pub const fn new(text: Option<&'a str>) -> Self {
        Self { text }
    }

    /// First `prefix{...}` token, or an empty string when there is none.
    ///
    /// The prefix is matched literally; the braces enclose any run of
    /// characters other than `}`.
    #[must_use]
    pub fn extract(&self, prefix: &str) -> String {
        let Some(text) = self.text else {
            return String::new();
        };

        let pattern = format!(r"{}\{{[^}}]*\}}", regex::escape(prefix));
        Regex::new(&pattern)
            .ok()
            .and_then(|regex| regex.find(text).map(|found| found.as_str().to_string()))
            .unwrap_or_default()
    }
}
