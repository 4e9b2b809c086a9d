//! Truncation and projection of a classified response into what the
//! presentation layer shows.
//!
//! # Design
//! `Content` holds exactly one thing: nothing, the decoded payload, the
//! truncation placeholder or a failure message. An oversized payload is
//! replaced wholesale, never cut, so the UI cannot render half a document.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::classify::{ClassifiedResponse, Payload};

/// Shown when a transport failure follows an earlier real response.
pub const PAYLOAD_MISMATCH_MESSAGE: &str =
    "Ooops! Encountered an error. Most likely returned payload does not match Content-type response header.";

/// Tri-state display classification of a completed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Success,
    Neutral,
    Error,
}

/// Map an HTTP status code to its display kind.
///
/// Informational and redirect classes are neutral; anything outside
/// 100..=599 is treated as an error.
pub fn status_kind(status: u16) -> OutcomeKind {
    match status {
        100..=199 | 300..=399 => OutcomeKind::Neutral,
        200..=299 => OutcomeKind::Success,
        _ => OutcomeKind::Error,
    }
}

/// Status shown next to an outcome: a real code, or the `Error` label when
/// no response was ever received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    Status(u16),
    Error,
}

impl ResponseCode {
    /// The recorded status, if it is a real one. `0` does not count.
    pub fn status(&self) -> Option<u16> {
        match self {
            ResponseCode::Status(0) | ResponseCode::Error => None,
            ResponseCode::Status(code) => Some(*code),
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseCode::Status(code) => write!(f, "{code}"),
            ResponseCode::Error => f.write_str("Error"),
        }
    }
}

impl Serialize for ResponseCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResponseCode::Status(code) => serializer.serialize_u16(*code),
            ResponseCode::Error => serializer.serialize_str("Error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Content {
    Empty,
    Payload(Payload),
    /// Payload longer than `limit`; only its size is kept.
    Truncated { limit: usize, length: usize },
    Message(String),
}

impl Content {
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Content::Payload(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, Content::Truncated { .. })
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Empty => Ok(()),
            Content::Payload(Payload::Text(text)) => f.write_str(text),
            Content::Payload(Payload::Structured(value)) => write!(f, "{value:#}"),
            Content::Truncated { limit, length } => write!(
                f,
                "Response maximum payload length of {limit} exceeded: ({length} characters)"
            ),
            Content::Message(message) => f.write_str(message),
        }
    }
}

/// Result of one invocation as presented to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseOutcome {
    pub kind: OutcomeKind,
    pub code: ResponseCode,
    pub content: Content,
    pub content_type: Option<String>,
}

impl ResponseOutcome {
    pub fn status(&self) -> Option<u16> {
        self.code.status()
    }
}

/// Replace `payload` with a placeholder when it is longer than `limit`.
pub fn truncate(payload: Payload, limit: usize) -> Content {
    let length = payload.content_length();
    if length > limit {
        Content::Truncated { limit, length }
    } else {
        Content::Payload(payload)
    }
}

/// Project a decoded response into its outcome. The status code survives
/// truncation.
pub fn project(response: ClassifiedResponse, limit: usize) -> ResponseOutcome {
    ResponseOutcome {
        kind: status_kind(response.status),
        code: ResponseCode::Status(response.status),
        content: truncate(response.payload, limit),
        content_type: response.content_type,
    }
}

/// Outcome for an attempt that produced no response.
///
/// Keeps the last real status code on screen when there is one.
pub fn failure_outcome(previous: Option<&ResponseOutcome>) -> ResponseOutcome {
    match previous.and_then(ResponseOutcome::status) {
        None => ResponseOutcome {
            kind: OutcomeKind::Error,
            code: ResponseCode::Error,
            content: Content::Empty,
            content_type: None,
        },
        Some(status) => ResponseOutcome {
            kind: OutcomeKind::Error,
            code: ResponseCode::Status(status),
            content: Content::Message(PAYLOAD_MISMATCH_MESSAGE.to_string()),
            content_type: None,
        },
    }
}
