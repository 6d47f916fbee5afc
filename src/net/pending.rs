//! Deferred result of a request.
//!
//! A transport reports the end of an exchange through a [`Completion`] (load or
//! error event). The caller observes it through the matching
//! [`PendingRequest`], a future that settles exactly once. The first event to
//! fire wins; any later event is logged and dropped.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures::FutureExt;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::errors::Rejection;
use crate::net::fetch::normalize;
use crate::net::{Response, ResponseResult};

/// Value a [`PendingRequest`] settles with.
pub type Outcome = Result<ResponseResult, Rejection>;

/// Lifecycle of a single request.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Configured but not handed to the transport yet.
    #[default]
    Idle,
    /// Handed to the transport, waiting for a load or error event.
    Sent,
    /// Settled with a 2xx response.
    Resolved,
    /// Settled with a rejection.
    Rejected,
}

impl RequestState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestState::Resolved | RequestState::Rejected)
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Creates a connected completion / pending request pair in the `Idle` state.
pub(crate) fn channel() -> (Completion, PendingRequest) {
    let (tx, rx) = oneshot::channel();
    let state = Arc::new(Mutex::new(RequestState::Idle));

    let completion = Completion {
        tx: Arc::new(Mutex::new(Some(tx))),
        state: state.clone(),
    };
    let pending = PendingRequest { rx: Some(rx), settled: None, state };

    (completion, pending)
}

/// Event sink handed to a [`Transport`](crate::net::Transport).
///
/// Clones share the same slot, so a transport may keep one clone per event
/// callback. Only the first event settles the request.
#[derive(Debug, Clone)]
pub struct Completion {
    tx: Arc<Mutex<Option<oneshot::Sender<Outcome>>>>,
    state: Arc<Mutex<RequestState>>,
}

impl Completion {
    /// Load event: a response was received.
    pub fn load(&self, response: Response) {
        if self.is_settled() {
            log::warn!("load event for {} after settlement ignored", response.url);
            return;
        }
        self.settle(normalize(response));
    }

    /// Error event: no response could be obtained.
    pub fn error(&self) {
        self.settle(Err(Rejection::Connection));
    }

    /// The request could not be opened at all.
    pub fn invalid(&self, reason: impl Into<String>) {
        self.settle(Err(Rejection::InvalidRequest(reason.into())));
    }

    pub fn is_settled(&self) -> bool {
        lock(&self.tx).is_none()
    }

    pub(crate) fn mark_sent(&self) {
        let mut state = lock(&self.state);
        if *state == RequestState::Idle {
            *state = RequestState::Sent;
        }
    }

    fn settle(&self, outcome: Outcome) {
        let mut slot = lock(&self.tx);
        let Some(tx) = slot.take() else {
            log::warn!("request already settled, dropping late outcome: {:?}", outcome.as_ref().err());
            return;
        };

        *lock(&self.state) = match &outcome {
            Ok(_) => RequestState::Resolved,
            Err(_) => RequestState::Rejected,
        };
        drop(slot);

        log::debug!("request settled: {}", if outcome.is_ok() { "resolved" } else { "rejected" });
        if tx.send(outcome).is_err() {
            // Caller dropped the pending request; nobody is listening.
            log::debug!("pending request dropped before settlement");
        }
    }
}

/// Deferred result of [`perform`](crate::perform).
///
/// Resolves with the normalized response on a 2xx status and rejects with a
/// [`Rejection`] otherwise. Dropping it does not abort the exchange.
#[derive(Debug)]
pub struct PendingRequest {
    rx: Option<oneshot::Receiver<Outcome>>,
    // Kept once received so later polls see the same result
    settled: Option<Outcome>,
    state: Arc<Mutex<RequestState>>,
}

impl PendingRequest {
    pub fn state(&self) -> RequestState {
        *lock(&self.state)
    }

    /// Blocks the current thread until the request settles.
    ///
    /// Must not be called from within the tokio runtime that drives the
    /// transport, as that would stall the exchange it waits on.
    pub fn wait(self) -> Outcome {
        futures::executor::block_on(self)
    }

    /// Returns the outcome if the request has settled, without blocking.
    ///
    /// Once settled, every call (and any later `.await`) yields the same outcome.
    pub fn try_settled(&mut self) -> Option<Outcome> {
        if let Some(rx) = self.rx.as_mut() {
            let outcome = match rx.try_recv() {
                Ok(outcome) => outcome,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Closed) => self.abandoned(),
            };
            self.rx = None;
            self.settled = Some(outcome);
        }
        self.settled.clone()
    }

    fn abandoned(&self) -> Outcome {
        log::warn!("transport dropped the request without a load or error event");
        *lock(&self.state) = RequestState::Rejected;
        Err(Rejection::Connection)
    }
}

impl Future for PendingRequest {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        if let Some(rx) = this.rx.as_mut() {
            let outcome = match rx.poll_unpin(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Ok(outcome)) => outcome,
                Poll::Ready(Err(_)) => this.abandoned(),
            };
            this.rx = None;
            this.settled = Some(outcome);
        }

        match &this.settled {
            Some(outcome) => Poll::Ready(outcome.clone()),
            None => Poll::Pending,
        }
    }
}
