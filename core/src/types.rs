//! Inputs to the pipeline: the documented operation and one user action.
//!
//! # Design
//! `OperationDescriptor` is owned by the documentation model and only read
//! here. `RequestInput` is built per click and consumed by a single
//! invocation. Parameter maps are ordered pairs rather than hash maps so the
//! query string comes out in the order the user filled the form.

use serde::{Deserialize, Serialize};

use crate::http::HttpMethod;

/// One documented endpoint + verb pair, as the documentation model sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    pub id: String,
    pub http_verb: HttpMethod,
    /// Path template with `{name}` placeholders, e.g. `/pets/{id}`.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodyMeta>,
}

impl OperationDescriptor {
    pub fn new(id: &str, http_verb: HttpMethod, path: &str) -> Self {
        Self {
            id: id.to_string(),
            http_verb,
            path: path.to_string(),
            request_body: None,
        }
    }

    pub fn with_request_body(mut self, meta: RequestBodyMeta) -> Self {
        self.request_body = Some(meta);
        self
    }

    /// Media type of the request-body representation currently selected in
    /// the UI, if any.
    pub fn active_media_type(&self) -> Option<&str> {
        self.request_body.as_ref().and_then(RequestBodyMeta::active)
    }
}

/// Request-body media types declared for an operation and which one is active.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RequestBodyMeta {
    pub media_types: Vec<String>,
    #[serde(default)]
    pub active_media_type: Option<usize>,
}

impl RequestBodyMeta {
    pub fn new<I, S>(media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            media_types: media_types.into_iter().map(Into::into).collect(),
            active_media_type: Some(0),
        }
    }

    pub fn select(mut self, index: usize) -> Self {
        self.active_media_type = Some(index);
        self
    }

    pub fn active(&self) -> Option<&str> {
        self.active_media_type
            .and_then(|idx| self.media_types.get(idx))
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }
}

/// Request payload as supplied by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestBody {
    /// Sent verbatim.
    Raw(String),
    /// Serialized to JSON before sending.
    Json(serde_json::Value),
}

impl From<String> for RequestBody {
    fn from(value: String) -> Self {
        RequestBody::Raw(value)
    }
}

impl From<&str> for RequestBody {
    fn from(value: &str) -> Self {
        RequestBody::Raw(value.to_string())
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        // A JSON string value is already the text to send.
        match value {
            serde_json::Value::String(s) => RequestBody::Raw(s),
            other => RequestBody::Json(other),
        }
    }
}

/// Everything the user typed into the try-it-out form for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestInput {
    pub headers: Vec<(String, String)>,
    pub query_params: Vec<(String, String)>,
    pub path_params: Vec<(String, String)>,
    pub cookie_params: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl RequestInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: &str, value: impl ToString) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query_params.push((name.to_string(), value.to_string()));
        self
    }

    pub fn path(mut self, name: &str, value: impl ToString) -> Self {
        self.path_params.push((name.to_string(), value.to_string()));
        self
    }

    pub fn cookie(mut self, name: &str, value: impl ToString) -> Self {
        self.cookie_params.push((name.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }
}
