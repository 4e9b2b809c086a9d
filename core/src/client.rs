//! Request construction for a single try-it-out invocation.
//!
//! # Design
//! `RequestBuilder` holds the server base URL and the fallback content type
//! and carries no state between calls. `build` turns an operation plus the
//! user's input into a `TransportRequest`; the caller decides how and when to
//! send it. This keeps the builder deterministic and trivially testable.

use tracing::debug;

use crate::compose::compose_url;
use crate::config::DEFAULT_CONTENT_TYPE;
use crate::error::TryOutError;
use crate::http::TransportRequest;
use crate::types::{OperationDescriptor, RequestBody, RequestInput};

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    default_content_type: String,
}

impl RequestBuilder {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            default_content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }

    pub fn with_default_content_type(mut self, content_type: &str) -> Self {
        self.default_content_type = content_type.to_string();
        self
    }

    /// Build the transport request for `operation` from `input`.
    ///
    /// Headers start with the computed `Content-Type` and are then overlaid
    /// with the caller's headers, so an explicit caller `Content-Type` wins.
    /// Bodies are dropped for GET, HEAD, OPTIONS and TRACE.
    pub fn build(
        &self,
        operation: &OperationDescriptor,
        input: &RequestInput,
    ) -> Result<TransportRequest, TryOutError> {
        let content_type = operation
            .active_media_type()
            .unwrap_or(&self.default_content_type);
        let mut headers = vec![("Content-Type".to_string(), content_type.to_string())];
        merge_headers(&mut headers, &input.headers);

        let method = operation.http_verb;
        let body = if method.forbids_body() {
            if input.body.is_some() {
                debug!(%method, operation = %operation.id, "dropping body for no-body verb");
            }
            None
        } else {
            input.body.as_ref().map(serialize_body).transpose()?
        };

        let path = compose_url(&operation.path, &input.path_params, &input.query_params);
        Ok(TransportRequest {
            method,
            url: self.resolve(&path),
            headers,
            body,
        })
    }

    fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') || self.base_url.is_empty() {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

/// Overlay `overrides` onto `headers`; names compare case-insensitively.
fn merge_headers(headers: &mut Vec<(String, String)>, overrides: &[(String, String)]) {
    for (name, value) in overrides {
        match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some(existing) => *existing = (name.clone(), value.clone()),
            None => headers.push((name.clone(), value.clone())),
        }
    }
}

fn serialize_body(body: &RequestBody) -> Result<String, TryOutError> {
    match body {
        RequestBody::Raw(text) => Ok(text.clone()),
        RequestBody::Json(value) => {
            serde_json::to_string(value).map_err(|e| TryOutError::SerializationError(e.to_string()))
        }
    }
}
