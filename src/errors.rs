use crate::net::ResponseResult;

/// Message carried by a connection-level rejection.
pub const CONNECTION_ERROR_MESSAGE: &str = "Unable to connect to the server.";

/// Reasons a [`PendingRequest`](crate::net::PendingRequest) can reject.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    /// A response arrived but its status is outside `200..300`.
    #[error("HTTP error: {} {}", .0.status, .0.status_text)]
    Http(ResponseResult),

    /// The transport could not establish or complete the exchange.
    #[error("Unable to connect to the server.")]
    Connection,

    /// The response declared `application/json` but the body did not parse.
    #[error("Cannot parse JSON response ({status} {status_text}): {message}")]
    Parse {
        status: u16,
        status_text: String,
        body: String,
        message: String,
    },

    /// The request could not be built (bad method, header or URL).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl Rejection {
    /// Returns the response carried by an HTTP-level rejection.
    pub fn response(&self) -> Option<&ResponseResult> {
        match self {
            Rejection::Http(resp) => Some(resp),
            _ => None,
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, Rejection::Connection)
    }
}
