//! Interactive "try it out" execution core for an OpenAPI documentation viewer.
//!
//! # Overview
//! Turns the values a user typed into an operation's try-out form into a real
//! HTTP request, sends it, and reduces whatever comes back (or doesn't) to a
//! bounded `ResponseOutcome` for display.
//!
//! # Design
//! - `compose` and `client` are pure: template + parameters in, request out.
//! - `classify` and `outcome` are pure: response in, outcome out.
//! - `dispatch` owns the only state (`ExecutionState`) and the only waits;
//!   the network and the clock are traits so tests need neither.
//! - `transport` is the production network layer, built on ureq.

pub mod classify;
pub mod client;
pub mod compose;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod outcome;
pub mod transport;
pub mod types;

pub use classify::{classify, ClassifiedResponse, Payload};
pub use client::RequestBuilder;
pub use compose::{compose_url, set_cookie_params, CookieStore, MemoryCookieJar};
pub use config::TryOutConfig;
pub use dispatch::{ExecutionState, Timer, TokioTimer, Transport, TryOutSession};
pub use error::TryOutError;
pub use http::{HttpMethod, HttpResponse, TransportRequest};
pub use outcome::{
    failure_outcome, project, status_kind, truncate, Content, OutcomeKind, ResponseCode,
    ResponseOutcome,
};
pub use transport::UreqTransport;
pub use types::{OperationDescriptor, RequestBody, RequestBodyMeta, RequestInput};
