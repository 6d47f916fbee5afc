//! Performs HTTP requests and hands back their normalized result as a future.
//!
//! [`perform`] issues one request and returns a [`PendingRequest`] right away.
//! It resolves with a [`ResponseResult`] (status, status text and content) when
//! the status is in `200..300`, and rejects with a [`Rejection`] otherwise:
//!
//! - [`Rejection::Http`] carries the same [`ResponseResult`] for any other status.
//! - [`Rejection::Connection`] when no response could be obtained.
//! - [`Rejection::Parse`] when an `application/json` body does not parse.
//! - [`Rejection::InvalidRequest`] when the request cannot be built.
//!
//! ```no_run
//! use request_adapter::{perform, RequestConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = RequestConfig::builder()
//!     .header("Accept", "application/json")
//!     .build()?;
//!
//! match perform("http://example.com/", Some(cfg)).await {
//!     Ok(resp) => println!("{} {}: {:?}", resp.status, resp.status_text, resp.content),
//!     Err(e) => eprintln!("request failed: {e}"),
//! }
//! # Ok(()) }
//! ```

pub mod config;
pub mod errors;
pub mod net;

pub use config::{Body, ClientConfig, ClientConfigError, RequestConfig, RequestConfigError};
pub use errors::{Rejection, CONNECTION_ERROR_MESSAGE};
pub use net::{
    perform, Completion, Content, OutgoingRequest, PendingRequest, RequestClient, RequestState,
    ReqwestTransport, Response, ResponseResult, Transport,
};
