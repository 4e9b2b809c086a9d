//! Error types for the try-it-out core.
//!
//! # Design
//! None of these errors escape `TryOutSession::invoke`; the dispatcher folds
//! every one of them into a failure outcome. They are still typed so the
//! lower layers (builder, transport, config loading) can be used and tested
//! on their own.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TryOutError {
    /// No response was received: connection refused, DNS, TLS, malformed URL.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The request body could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// A configuration value was rejected or the file could not be read.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown HTTP method: {0}")]
    UnknownMethod(String),

    /// The cookie store refused a cookie.
    #[error("cookie rejected: {0}")]
    Cookie(String),
}
