//! Response models.
//!
//! Two shapes live here:
//!
//! - [`Response`]: the **fully buffered** response as a transport received it.
//!   It holds the final URL (after redirects, if the transport follows them),
//!   status code + reason, response headers and the raw body bytes.
//! - [`ResponseResult`]: the normalized value a caller gets back from
//!   [`perform`](crate::perform). Only status, status text and content are
//!   kept; the content is parsed JSON when the response declared exactly
//!   `application/json`, and the body text otherwise.
//!
//! ## Notes
//! - `headers` is an `http::HeaderMap`, which is **case-insensitive** for
//!   header names.
//! - `status_text` is the reason phrase from the status line. Transports fall
//!   back to the canonical phrase, and to `"Unknown"` for non-standard codes.

use encoding_rs::{Encoding, UTF_8};
use http::header::CONTENT_TYPE;
use http::HeaderMap;
use serde::Serialize;

/// Content type that switches the body to parsed JSON. Matched literally.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Simple structure for HTTP responses as received by a transport.
///
/// All fields reflect the **received** response as-is; no additional parsing
/// or transformation is performed by this type.
#[derive(Debug, Clone)]
pub struct Response {
    /// Final URL of the response (after redirects, if any).
    pub url: url::Url,

    /// Numeric HTTP status code (e.g., `200`, `404`).
    pub status: u16,

    /// Human-readable reason phrase (e.g., `"OK"`, `"Not Found"`).
    pub status_text: String,

    /// Response headers as a case-insensitive map.
    pub headers: HeaderMap,

    /// Raw response body bytes.
    pub body: Vec<u8>,
}

impl Response {
    /// Declared content type. Repeated headers are joined with `", "`.
    pub fn content_type(&self) -> Option<String> {
        let values: Vec<&str> = self
            .headers
            .get_all(CONTENT_TYPE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();

        if values.is_empty() {
            None
        } else {
            Some(values.join(", "))
        }
    }

    /// True when the content type is exactly `application/json`.
    pub fn is_json(&self) -> bool {
        self.content_type().as_deref() == Some(JSON_CONTENT_TYPE)
    }

    /// `charset` parameter of the declared content type, unquoted.
    pub fn charset(&self) -> Option<String> {
        let ct = self.content_type()?;
        let idx = ct.to_ascii_lowercase().find("charset=")?;
        let after = &ct[idx + "charset=".len()..];
        let end = after.find([';', ',', ' ', '\t']).unwrap_or(after.len());
        Some(after[..end].trim_matches('"').to_string())
    }

    /// Body decoded to text with the declared charset. Unknown or missing
    /// charsets decode as UTF-8; invalid sequences become U+FFFD.
    pub fn text(&self) -> String {
        let encoding = self
            .charset()
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or(UTF_8);
        let (text, _, _) = encoding.decode(&self.body);
        text.into_owned()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Body of a normalized response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Content {
    /// Raw body text.
    Text(String),
    /// Parsed body of an `application/json` response.
    Json(serde_json::Value),
}

impl Content {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(s) => Some(s),
            Content::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Content::Json(v) => Some(v),
            Content::Text(_) => None,
        }
    }
}

/// Normalized response handed to the caller, on success and on HTTP errors alike.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseResult {
    pub status: u16,
    pub status_text: String,
    pub content: Content,
}
