//! Request and client configuration.
//!
//! [`RequestConfig`] describes a single call to [`perform`](crate::perform):
//! the HTTP method, the request headers and an optional body. Every field is
//! optional and falls back to a documented default:
//!
//! - `method`: `GET` when absent or empty.
//! - `headers`: none. Headers are applied in the order they were added.
//! - `body`: none. An empty text or byte body counts as no body.
//!
//! [`ClientConfig`] holds the settings of a [`RequestClient`](crate::RequestClient)
//! that are shared by every call made through it (user agent, redirect limit).
//!
//! Both types have a fluent builder that validates on `build()`.
//!
//! # Examples
//!
//! ```rust
//! use request_adapter::RequestConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = RequestConfig::builder()
//!     .method("POST")
//!     .header("Authorization", "Token ojasd9usduhfs")
//!     .body("{ \"some\": \"Request\" }")
//!     .build()?;
//! assert_eq!(cfg.method(), "POST");
//! # Ok(()) }
//! ```

use http::{HeaderName, HeaderValue, Method};
use std::fmt;

pub const DEFAULT_METHOD: &str = "GET";
const DEFAULT_USER_AGENT: &str = "RequestAdapter/0.1 (+https://crates.io/crates/request-adapter)";
const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Payload sent with a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Text payload, sent as-is.
    Text(String),
    /// Raw bytes, sent as-is.
    Bytes(Vec<u8>),
    /// Structured payload, serialized to JSON text before sending.
    Json(serde_json::Value),
}

impl Body {
    /// Bytes to put on the wire, or `None` when the body is empty.
    pub(crate) fn into_bytes(self) -> Option<Vec<u8>> {
        let bytes = match self {
            Body::Text(s) => s.into_bytes(),
            Body::Bytes(b) => b,
            Body::Json(v) => v.to_string().into_bytes(),
        };

        if bytes.is_empty() {
            None
        } else {
            Some(bytes)
        }
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Body::Text(s.to_string())
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Text(s)
    }
}

impl From<Vec<u8>> for Body {
    fn from(b: Vec<u8>) -> Self {
        Body::Bytes(b)
    }
}

impl From<serde_json::Value> for Body {
    fn from(v: serde_json::Value) -> Self {
        Body::Json(v)
    }
}

/// Per-call configuration. All fields fall back to defaults when left empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestConfig {
    /// HTTP verb. `None` or an empty string means `GET`.
    pub method: Option<String>,
    /// Request headers, applied in this order.
    pub headers: Vec<(String, String)>,
    /// Request payload.
    pub body: Option<Body>,
}

impl RequestConfig {
    pub fn builder() -> RequestConfigBuilder {
        RequestConfigBuilder::default()
    }

    /// Method to use, with the default applied.
    pub fn method(&self) -> &str {
        match self.method.as_deref() {
            Some(m) if !m.is_empty() => m,
            _ => DEFAULT_METHOD,
        }
    }

    /// Checks that the method and every header can go on the wire.
    pub fn validate(&self) -> Result<(), RequestConfigError> {
        self.parts().map(|_| ())
    }

    /// Method and headers converted to their wire types, headers in order.
    pub(crate) fn parts(&self) -> Result<(Method, Vec<(HeaderName, HeaderValue)>), RequestConfigError> {
        let method = Method::from_bytes(self.method().as_bytes())
            .map_err(|_| RequestConfigError::InvalidMethod(self.method().to_string()))?;

        let headers = self
            .headers
            .iter()
            .map(|(name, value)| {
                let header_name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|_| RequestConfigError::InvalidHeaderName(name.clone()))?;
                let header_value = HeaderValue::from_str(value)
                    .map_err(|_| RequestConfigError::InvalidHeaderValue(name.clone()))?;
                Ok((header_name, header_value))
            })
            .collect::<Result<Vec<_>, RequestConfigError>>()?;

        Ok((method, headers))
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestConfigBuilder {
    inner: RequestConfig,
}

impl RequestConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut RequestConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn method<S: Into<String>>(self, method: S) -> Self { self.map(|c| c.method = Some(method.into())) }
    pub fn header<K: Into<String>, V: Into<String>>(self, name: K, value: V) -> Self {
        self.map(|c| c.headers.push((name.into(), value.into())))
    }
    pub fn body<B: Into<Body>>(self, body: B) -> Self { self.map(|c| c.body = Some(body.into())) }

    /// Adds several headers, keeping their iteration order.
    pub fn headers<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.map(|c| {
            c.headers
                .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())))
        })
    }

    /// Validate and build the final config.
    pub fn build(self) -> Result<RequestConfig, RequestConfigError> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestConfigError {
    InvalidMethod(String),
    InvalidHeaderName(String),
    InvalidHeaderValue(String),
}

impl fmt::Display for RequestConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestConfigError::InvalidMethod(m) => write!(f, "invalid HTTP method {m:?}"),
            RequestConfigError::InvalidHeaderName(n) => write!(f, "invalid header name {n:?}"),
            RequestConfigError::InvalidHeaderValue(n) => write!(f, "invalid value for header {n:?}"),
        }
    }
}
impl std::error::Error for RequestConfigError {}

/// Settings shared by every request made through one client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent sent with each request. `None` sends no user agent.
    pub user_agent: Option<String>,
    /// Redirects the transport follows before handing back the response.
    pub max_redirects: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    inner: ClientConfig,
}

impl ClientConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut ClientConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn user_agent<S: Into<String>>(self, ua: S) -> Self { self.map(|c| c.user_agent = Some(ua.into())) }
    pub fn no_user_agent(self) -> Self { self.map(|c| c.user_agent = None) }
    pub fn max_redirects(self, n: usize) -> Self { self.map(|c| c.max_redirects = n) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
        if let Some(ua) = &self.inner.user_agent {
            if HeaderValue::from_str(ua).is_err() {
                return Err(ClientConfigError::InvalidUserAgent(ua.clone()));
            }
        }
        Ok(self.inner)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientConfigError {
    InvalidUserAgent(String),
}

impl fmt::Display for ClientConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientConfigError::InvalidUserAgent(ua) =>
                write!(f, "user agent {ua:?} is not a valid header value"),
        }
    }
}
impl std::error::Error for ClientConfigError {}
