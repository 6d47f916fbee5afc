use std::fmt;
use std::sync::Arc;

use crate::config::{Body, ClientConfig, RequestConfig};
use crate::errors::Rejection;
use crate::net::pending::{self, Outcome};
use crate::net::{Content, OutgoingRequest, PendingRequest, ReqwestTransport, Response, ResponseResult, Transport};

/// Issues requests through a transport and hands back deferred results.
#[derive(Clone)]
pub struct RequestClient {
    transport: Arc<dyn Transport>,
}

impl RequestClient {
    /// Creates a client on the default `reqwest` transport. Can use None for the
    /// default configuration.
    pub fn new(config: Option<ClientConfig>) -> Self {
        Self::with_transport(Arc::new(ReqwestTransport::new(config.unwrap_or_default())))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Issues one request and returns immediately.
    ///
    /// Missing configuration fields fall back to their defaults (`GET`, no
    /// headers, no body). `url` is handed to the transport untouched.
    pub fn perform(&self, url: &str, config: Option<RequestConfig>) -> PendingRequest {
        let (completion, pending) = pending::channel();

        let request = match prepare(url, config.unwrap_or_default()) {
            Ok(request) => request,
            Err(reason) => {
                log::debug!("not sending request to {url}: {reason}");
                completion.invalid(reason);
                return pending;
            }
        };

        log::debug!("{} {}", request.method, request.url);
        completion.mark_sent();
        self.transport.dispatch(request, completion);

        pending
    }
}

impl Default for RequestClient {
    fn default() -> Self {
        Self::new(None)
    }
}

impl fmt::Debug for RequestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestClient").finish_non_exhaustive()
    }
}

/// Issues one request with a default client. See [`RequestClient::perform`].
pub fn perform(url: &str, config: Option<RequestConfig>) -> PendingRequest {
    RequestClient::default().perform(url, config)
}

fn prepare(url: &str, config: RequestConfig) -> Result<OutgoingRequest, String> {
    let (method, headers) = config.parts().map_err(|e| e.to_string())?;

    Ok(OutgoingRequest {
        method,
        url: url.to_string(),
        headers,
        body: config.body.and_then(Body::into_bytes),
    })
}

/// Turns a received response into the value the request settles with.
pub(crate) fn normalize(response: Response) -> Outcome {
    let success = response.is_success();
    let raw = response.text();

    let content = if response.is_json() {
        match serde_json::from_str(&raw) {
            Ok(value) => Content::Json(value),
            Err(e) => {
                return Err(Rejection::Parse {
                    status: response.status,
                    status_text: response.status_text,
                    body: raw,
                    message: e.to_string(),
                })
            }
        }
    } else {
        Content::Text(raw)
    };

    let result = ResponseResult {
        status: response.status,
        status_text: response.status_text,
        content,
    };

    if success {
        Ok(result)
    } else {
        Err(Rejection::Http(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{Completion, RequestState};
    use http::header::CONTENT_TYPE;
    use http::{HeaderMap, HeaderValue, Method};
    use serde_json::json;
    use std::sync::Mutex;

    fn response(status: u16, status_text: &str, content_type: Option<&str>, body: &str) -> Response {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_str(ct).unwrap());
        }
        Response {
            url: "http://example.com/".parse().unwrap(),
            status,
            status_text: status_text.into(),
            headers,
            body: body.as_bytes().to_vec(),
        }
    }

    /// Records what it was asked to send and answers with a canned sequence of events.
    struct ScriptedTransport {
        sent: Mutex<Vec<OutgoingRequest>>,
        events: Vec<Event>,
    }

    #[derive(Clone)]
    enum Event {
        Load(u16, &'static str, Option<&'static str>, &'static str),
        Error,
    }

    impl ScriptedTransport {
        fn new(events: Vec<Event>) -> Arc<Self> {
            Arc::new(Self { sent: Mutex::new(Vec::new()), events })
        }

        fn sent(&self) -> Vec<OutgoingRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        fn dispatch(&self, request: OutgoingRequest, completion: Completion) {
            self.sent.lock().unwrap().push(request);
            for event in &self.events {
                match event.clone() {
                    Event::Load(status, text, ct, body) => completion.load(response(status, text, ct, body)),
                    Event::Error => completion.error(),
                }
            }
        }
    }

    #[tokio::test]
    async fn defaults_are_applied() {
        let transport = ScriptedTransport::new(vec![Event::Load(200, "OK", None, "fine")]);
        let client = RequestClient::with_transport(transport.clone());

        let resp = client.perform("http://example.com/", None).await.unwrap();
        assert_eq!(resp.content, Content::Text("fine".into()));

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::GET);
        assert_eq!(sent[0].url, "http://example.com/");
        assert!(sent[0].headers.is_empty());
        assert!(sent[0].body.is_none());
    }

    #[tokio::test]
    async fn url_and_headers_pass_through_in_order() {
        let transport = ScriptedTransport::new(vec![Event::Load(200, "OK", None, "")]);
        let client = RequestClient::with_transport(transport.clone());

        let cfg = RequestConfig::builder()
            .method("PATCH")
            .header("Authorization", "Token ojasd9usduhfs")
            .header("Accept", "application/json")
            .body(json!({"some": "Request"}))
            .build()
            .unwrap();
        client.perform("http://example.com/a b?x=%zz", Some(cfg)).await.unwrap();

        let sent = transport.sent();
        assert_eq!(sent[0].method, Method::PATCH);
        assert_eq!(sent[0].url, "http://example.com/a b?x=%zz");
        let headers: Vec<(&str, &str)> = sent[0]
            .headers
            .iter()
            .map(|(n, v)| (n.as_str(), v.to_str().unwrap()))
            .collect();
        assert_eq!(headers, [("authorization", "Token ojasd9usduhfs"), ("accept", "application/json")]);
        assert_eq!(sent[0].body.as_deref(), Some(br#"{"some":"Request"}"#.as_slice()));
    }

    #[tokio::test]
    async fn invalid_method_rejects_without_dispatch() {
        let transport = ScriptedTransport::new(vec![Event::Load(200, "OK", None, "")]);
        let client = RequestClient::with_transport(transport.clone());

        let cfg = RequestConfig { method: Some("NOT VALID".into()), ..Default::default() };
        let pending = client.perform("http://example.com/", Some(cfg));
        assert_eq!(pending.state(), RequestState::Rejected);

        let err = pending.await.unwrap_err();
        assert!(matches!(err, Rejection::InvalidRequest(ref m) if m.contains("NOT VALID")));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn double_signal_settles_once() {
        let transport = ScriptedTransport::new(vec![
            Event::Error,
            Event::Load(200, "OK", None, "too late"),
        ]);
        let client = RequestClient::with_transport(transport);

        let pending = client.perform("http://example.com/", None);
        assert_eq!(pending.state(), RequestState::Rejected);
        assert_eq!(pending.await, Err(Rejection::Connection));
    }

    #[tokio::test]
    async fn silent_transport_rejects_as_connection_error() {
        let transport = ScriptedTransport::new(Vec::new());
        let client = RequestClient::with_transport(transport);

        assert_eq!(client.perform("http://example.com/", None).await, Err(Rejection::Connection));
    }

    #[test]
    fn normalize_parses_exact_json_only() {
        let body = r#"{ "some": "Response" }"#;

        let resp = normalize(response(200, "OK", Some("application/json"), body)).unwrap();
        assert_eq!(resp.content, Content::Json(json!({"some": "Response"})));

        let resp = normalize(response(200, "OK", Some("application/json; charset=utf-8"), body)).unwrap();
        assert_eq!(resp.content, Content::Text(body.into()));

        let resp = normalize(response(200, "OK", None, body)).unwrap();
        assert_eq!(resp.content, Content::Text(body.into()));
    }

    #[test]
    fn normalize_rejects_outside_2xx() {
        let err = normalize(response(500, "Internal Server Error", Some("application/json"), r#"{"e":1}"#)).unwrap_err();
        assert_eq!(
            err,
            Rejection::Http(ResponseResult {
                status: 500,
                status_text: "Internal Server Error".into(),
                content: Content::Json(json!({"e": 1})),
            })
        );

        let err = normalize(response(304, "Not Modified", None, "")).unwrap_err();
        assert_eq!(err.response().map(|r| r.status), Some(304));
    }

    #[test]
    fn malformed_json_rejects_with_parse_error() {
        let err = normalize(response(200, "OK", Some("application/json"), "{ not json")).unwrap_err();
        match err {
            Rejection::Parse { status, status_text, body, message } => {
                assert_eq!(status, 200);
                assert_eq!(status_text, "OK");
                assert_eq!(body, "{ not json");
                assert!(!message.is_empty());
            }
            other => panic!("unexpected rejection: {other:?}"),
        }
    }
}
