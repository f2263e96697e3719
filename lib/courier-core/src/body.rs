//! Request bodies and their serialization.
//!
//! A [`Body`] is turned into wire bytes by [`serialize_body`], which dispatches
//! on the configured content-type tag.

use bytes::Bytes;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;

use crate::{Form, Result};

/// Characters escaped in form-urlencoded keys and values.
///
/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Content types the body serializer knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// JSON content type (`application/json`).
    Json,
    /// Form URL-encoded content type (`application/x-www-form-urlencoded`).
    FormUrlEncoded,
    /// Multipart form content type (`multipart/form-data`).
    Multipart,
    /// Plain text content type (`text/plain`).
    PlainText,
    /// Binary content type (`application/octet-stream`).
    OctetStream,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded",
            Self::Multipart => "multipart/form-data",
            Self::PlainText => "text/plain",
            Self::OctetStream => "application/octet-stream",
        }
    }

    /// Recognize a content-type tag by its MIME essence.
    ///
    /// Parameters such as `charset` and letter case are ignored.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let essence = tag.split(';').next().unwrap_or_default().trim();
        [
            Self::Json,
            Self::FormUrlEncoded,
            Self::Multipart,
            Self::PlainText,
            Self::OctetStream,
        ]
        .into_iter()
        .find(|candidate| candidate.as_str().eq_ignore_ascii_case(essence))
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ContentType> for String {
    fn from(content_type: ContentType) -> Self {
        content_type.as_str().to_string()
    }
}

/// A request body.
#[derive(Debug, Clone)]
pub enum Body {
    /// Text sent as-is whatever the content type.
    Text(String),
    /// A structured value serialized according to the content type.
    Value(Value),
    /// A multipart form.
    Multipart(Form),
}

impl Body {
    /// Structured body from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as JSON.
    pub fn json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self::Value(serde_json::to_value(value)?))
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Form> for Body {
    fn from(form: Form) -> Self {
        Self::Multipart(form)
    }
}

/// Serialize a body for the given content-type tag.
///
/// Text passes through untouched. Otherwise:
/// - JSON tag: JSON text
/// - form-urlencoded tag: the body's own `key=value` pairs, percent-encoded, joined by `&`
/// - multipart tag: the form payload unchanged
/// - anything else, including an empty tag: the body's default string form
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Example
///
/// ```
/// use courier_core::{Body, serialize_body};
/// use serde_json::json;
///
/// let body = Body::from(json!({"a": 1}));
/// assert_eq!(serialize_body(body.clone(), "application/json").expect("json").as_ref(), br#"{"a":1}"#);
/// assert_eq!(serialize_body(body, "application/x-www-form-urlencoded").expect("form").as_ref(), b"a=1");
/// ```
pub fn serialize_body(body: Body, tag: &str) -> Result<Bytes> {
    let value = match body {
        Body::Text(text) => return Ok(Bytes::from(text)),
        Body::Value(Value::String(text)) => return Ok(Bytes::from(text)),
        Body::Multipart(form) => return Ok(form.encode()),
        Body::Value(value) => value,
    };

    match ContentType::from_tag(tag) {
        Some(ContentType::Json) => Ok(Bytes::from(serde_json::to_vec(&value)?)),
        Some(ContentType::FormUrlEncoded) => Ok(Bytes::from(to_form(&value))),
        _ => Ok(Bytes::from(value.to_string())),
    }
}

/// Percent-encode the own key-value pairs of a value as a form body.
///
/// Objects contribute their fields, arrays their indices; scalars have no
/// pairs. String values are encoded without quotes, other values as JSON text.
#[must_use]
pub fn to_form(value: &Value) -> String {
    let pairs: Vec<(String, String)> = match value {
        Value::Object(fields) => fields
            .iter()
            .map(|(key, value)| (key.clone(), field_text(value)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, value)| (index.to_string(), field_text(value)))
            .collect(),
        _ => Vec::new(),
    };

    pairs
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, COMPONENT_ENCODE_SET),
                utf8_percent_encode(value, COMPONENT_ENCODE_SET)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
