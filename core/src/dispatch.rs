//! The try-it-out session: one per operation panel.
//!
//! # Design
//! `TryOutSession::invoke` runs compose → build → transport → classify →
//! truncate → project and never fails; every error becomes an outcome.
//! Shared state lives in a `watch` channel so any number of observers can
//! follow `pending` and the last outcome.
//!
//! Invocations may overlap. Each one draws a sequence number when it starts,
//! and only the most recently started invocation is allowed to write the
//! shared state. A superseded invocation still runs to completion and hands
//! its outcome to its own caller.
//!
//! Delays go through the `Timer` trait so tests can run on paused time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::classify::classify;
use crate::client::RequestBuilder;
use crate::compose::{set_cookie_params, CookieStore, MemoryCookieJar};
use crate::config::TryOutConfig;
use crate::error::TryOutError;
use crate::http::{HttpResponse, TransportRequest};
use crate::outcome::{failure_outcome, project, ResponseOutcome};
use crate::types::{OperationDescriptor, RequestInput};

/// Sends a request over the network.
///
/// Every status code is a successful `HttpResponse`; `Err` means no response
/// arrived at all.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: TransportRequest) -> Result<HttpResponse, TryOutError>;

    /// The store this transport reads cookies from, if it sends any.
    ///
    /// A session adopts it so cookie parameters reach the wire.
    fn cookie_store(&self) -> Option<Arc<dyn CookieStore>> {
        None
    }
}

#[async_trait]
pub trait Timer: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// `Timer` backed by the tokio clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// What the presentation layer observes for one operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionState {
    pub pending: bool,
    pub last_outcome: Option<ResponseOutcome>,
}

pub struct TryOutSession {
    operation: OperationDescriptor,
    config: TryOutConfig,
    builder: RequestBuilder,
    transport: Arc<dyn Transport>,
    cookies: Arc<dyn CookieStore>,
    timer: Arc<dyn Timer>,
    state: watch::Sender<ExecutionState>,
    sequence: AtomicU64,
}

impl TryOutSession {
    pub fn new(
        operation: OperationDescriptor,
        builder: RequestBuilder,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let cookies = transport
            .cookie_store()
            .unwrap_or_else(|| Arc::new(MemoryCookieJar::new()));
        Self {
            operation,
            config: TryOutConfig::default(),
            builder,
            transport,
            cookies,
            timer: Arc::new(TokioTimer),
            state: watch::Sender::new(ExecutionState::default()),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn with_config(mut self, config: TryOutConfig) -> Self {
        self.builder = self
            .builder
            .with_default_content_type(&config.default_content_type);
        self.config = config;
        self
    }

    pub fn with_cookie_store(mut self, cookies: Arc<dyn CookieStore>) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn with_timer(mut self, timer: Arc<dyn Timer>) -> Self {
        self.timer = timer;
        self
    }

    pub fn operation(&self) -> &OperationDescriptor {
        &self.operation
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ExecutionState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ExecutionState> {
        self.state.subscribe()
    }

    /// Execute the operation with `input`.
    ///
    /// The pending flag goes up before anything else and comes down once the
    /// settle delay after transport completion has passed. The returned
    /// outcome is the one this invocation produced, whether or not it was
    /// still current enough to be published. Dropping the future before it
    /// completes still clears `pending`.
    pub async fn invoke(&self, input: RequestInput) -> ResponseOutcome {
        let ticket = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| state.pending = true);
        let settle_guard = SettleOnDrop {
            session: self,
            ticket,
        };
        debug!(operation = %self.operation.id, ticket, "invocation started");

        set_cookie_params(self.cookies.as_ref(), &input.cookie_params);
        let result = self.send(&input).await;

        let report = async move {
            let outcome = match result {
                Ok(response) => project(classify(response), self.config.max_content_length),
                Err(e) => {
                    warn!(operation = %self.operation.id, ticket, error = %e, "request failed");
                    self.timer.sleep(self.config.failure_delay()).await;
                    let previous = self.state.borrow().last_outcome.clone();
                    failure_outcome(previous.as_ref())
                }
            };
            self.publish(ticket, &outcome);
            outcome
        };
        let settle = self.timer.sleep(self.config.settle_delay());
        let (outcome, ()) = futures::join!(report, settle);

        drop(settle_guard);
        outcome
    }

    async fn send(&self, input: &RequestInput) -> Result<HttpResponse, TryOutError> {
        let request = self.builder.build(&self.operation, input)?;
        debug!(method = %request.method, url = %request.url, "dispatching");
        self.transport.execute(request).await
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.sequence.load(Ordering::SeqCst) == ticket
    }

    fn publish(&self, ticket: u64, outcome: &ResponseOutcome) {
        if !self.is_current(ticket) {
            debug!(operation = %self.operation.id, ticket, "superseded, outcome not published");
            return;
        }
        self.state
            .send_modify(|state| state.last_outcome = Some(outcome.clone()));
    }

    fn settle(&self, ticket: u64) {
        if !self.is_current(ticket) {
            return;
        }
        self.state.send_if_modified(|state| {
            let was_pending = state.pending;
            state.pending = false;
            was_pending
        });
        debug!(operation = %self.operation.id, ticket, "settled");
    }
}

/// Settles its invocation when dropped, whether it finished or was cancelled.
struct SettleOnDrop<'a> {
    session: &'a TryOutSession,
    ticket: u64,
}

impl Drop for SettleOnDrop<'_> {
    fn drop(&mut self) {
        self.session.settle(self.ticket);
    }
}
