//! Networking: issuing requests and normalizing their responses.

mod fetch;
mod pending;
mod response;
mod transport;

pub use fetch::{perform, RequestClient};
pub use pending::{Completion, Outcome, PendingRequest, RequestState};
pub use response::{Content, Response, ResponseResult, JSON_CONTENT_TYPE};
pub use transport::{OutgoingRequest, ReqwestTransport, Transport};
