//! Transport primitive.
//!
//! A [`Transport`] performs one HTTP exchange and reports how it ended through
//! the [`Completion`] it was handed: `load` when a response arrived, `error`
//! when none could be obtained. It must not block the caller of `dispatch`.
//!
//! [`ReqwestTransport`] is the default implementation.

use http::{HeaderName, HeaderValue, Method};
use lazy_static::lazy_static;
use tokio::runtime::{Builder, Handle, Runtime};
use url::Url;

use crate::config::ClientConfig;
use crate::net::{Completion, Response};

/// A request ready to go on the wire.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: Method,
    /// Target address, exactly as the caller passed it.
    pub url: String,
    /// Headers in the order they must be applied.
    pub headers: Vec<(HeaderName, HeaderValue)>,
    pub body: Option<Vec<u8>>,
}

/// Something that can carry out an HTTP exchange.
pub trait Transport: Send + Sync {
    /// Starts the exchange and returns immediately. Exactly one event should
    /// eventually be signalled on `completion`.
    fn dispatch(&self, request: OutgoingRequest, completion: Completion);
}

lazy_static! {
    // Used when `dispatch` is called outside of a tokio runtime.
    static ref FALLBACK_RUNTIME: Option<Runtime> = {
        match Builder::new_multi_thread()
            .enable_all()
            .thread_name("request-adapter")
            .build()
        {
            Ok(rt) => Some(rt),
            Err(e) => {
                log::error!("Failed to create fallback Tokio runtime: {e}");
                None
            }
        }
    };
}

fn runtime_handle() -> Option<Handle> {
    Handle::try_current()
        .ok()
        .or_else(|| FALLBACK_RUNTIME.as_ref().map(|rt| rt.handle().clone()))
}

/// Transport backed by `reqwest`. Every exchange gets its own client, so no
/// connection is ever reused between requests.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    config: ClientConfig,
}

impl ReqwestTransport {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Transport for ReqwestTransport {
    fn dispatch(&self, request: OutgoingRequest, completion: Completion) {
        let url = match Url::parse(&request.url) {
            Ok(url) => url,
            Err(e) => {
                completion.invalid(format!("cannot parse URL {:?}: {e}", request.url));
                return;
            }
        };

        let Some(handle) = runtime_handle() else {
            completion.error();
            return;
        };

        let config = self.config.clone();
        handle.spawn(async move {
            match fetch(&config, url, request).await {
                Ok(resp) => completion.load(resp),
                Err(e) => {
                    log::debug!("request failed: {e}");
                    completion.error();
                }
            }
        });
    }
}

// Performs the exchange and buffers the whole response
async fn fetch(
    config: &ClientConfig,
    url: Url,
    request: OutgoingRequest,
) -> Result<Response, reqwest::Error> {
    let redirect = match config.max_redirects {
        0 => reqwest::redirect::Policy::none(),
        n => reqwest::redirect::Policy::limited(n),
    };

    let mut builder = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .redirect(redirect);
    if let Some(ua) = &config.user_agent {
        builder = builder.user_agent(ua.as_str());
    }
    let client = builder.build()?;

    let mut req = client.request(request.method, url);
    for (name, value) in request.headers {
        req = req.header(name, value);
    }
    if let Some(body) = request.body {
        req = req.body(body);
    }
    let res = req.send().await?;

    // Fetch results
    let final_url = res.url().clone();
    let status = res.status().as_u16();
    let status_text = reason_phrase(&res);
    let headers = res.headers().clone();

    // Fetch body. We don't do streaming
    let body = res.bytes().await?.to_vec();

    Ok(Response {
        url: final_url,
        status,
        status_text,
        headers,
        body,
    })
}

// hyper only records the phrase when it differs from the canonical one
fn reason_phrase(res: &reqwest::Response) -> String {
    if let Some(reason) = res.extensions().get::<hyper::ext::ReasonPhrase>() {
        if !reason.as_bytes().is_empty() {
            return String::from_utf8_lossy(reason.as_bytes()).into_owned();
        }
    }
    res.status().canonical_reason().unwrap_or("Unknown").to_string()
}
