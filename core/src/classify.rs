//! Response classification: decide how to decode a payload and measure it.

use serde::Serialize;
use tracing::warn;

use crate::http::HttpResponse;

const JSON_MEDIA_TYPE: &str = "application/json";

/// Decoded response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "format", content = "value", rename_all = "snake_case")]
pub enum Payload {
    Structured(serde_json::Value),
    Text(String),
}

impl Payload {
    /// Displayed length in characters.
    ///
    /// Textual values (plain text, or a JSON document that is a single
    /// string) count their own characters; anything else counts its compact
    /// JSON form. Characters are UTF-16 code units, as a browser counts them.
    pub fn content_length(&self) -> usize {
        match self {
            Payload::Text(text) => utf16_len(text),
            Payload::Structured(serde_json::Value::String(text)) => utf16_len(text),
            Payload::Structured(value) => serde_json::to_string(value)
                .map(|s| utf16_len(&s))
                .unwrap_or(0),
        }
    }
}

fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// A response whose body has been decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub payload: Payload,
}

impl ClassifiedResponse {
    pub fn content_length(&self) -> usize {
        self.payload.content_length()
    }
}

/// Decode `response` according to its declared content type.
///
/// A body labelled JSON that fails to parse is kept as text; the mismatch is
/// logged but is not a failure.
pub fn classify(response: HttpResponse) -> ClassifiedResponse {
    let content_type = response.content_type().map(str::to_string);
    let declares_json = content_type
        .as_deref()
        .is_some_and(|ct| ct.to_ascii_lowercase().contains(JSON_MEDIA_TYPE));

    let payload = if declares_json {
        match serde_json::from_str(&response.body) {
            Ok(value) => Payload::Structured(value),
            Err(e) => {
                warn!(
                    status = response.status,
                    error = %e,
                    "response content type specified as 'application/json' but payload is not valid JSON"
                );
                Payload::Text(response.body)
            }
        }
    } else {
        Payload::Text(response.body)
    };

    ClassifiedResponse {
        status: response.status,
        content_type,
        payload,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn response(status: u16, content_type: Option<&str>, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: content_type
                .map(|ct| vec![("content-type".to_string(), ct.to_string())])
                .unwrap_or_default(),
            body: body.to_string(),
        }
    }

    #[test]
    fn json_content_type_decodes_structured() {
        let classified = classify(response(200, Some("application/json; charset=utf-8"), r#"{"id":7}"#));
        assert_eq!(classified.payload, Payload::Structured(json!({"id": 7})));
        assert_eq!(classified.content_type.as_deref(), Some("application/json; charset=utf-8"));
    }

    #[test]
    fn mislabeled_json_falls_back_to_text() {
        let classified = classify(response(200, Some("application/json"), "definitely not json"));
        assert_eq!(classified.payload, Payload::Text("definitely not json".to_string()));
        assert_eq!(classified.status, 200);
    }

    #[test]
    fn other_content_types_are_text() {
        let classified = classify(response(200, Some("text/plain"), r#"{"id":7}"#));
        assert_eq!(classified.payload, Payload::Text(r#"{"id":7}"#.to_string()));
    }

    #[test]
    fn missing_content_type_is_text() {
        let classified = classify(response(204, None, ""));
        assert_eq!(classified.payload, Payload::Text(String::new()));
        assert_eq!(classified.content_type, None);
    }

    #[test]
    fn structured_length_is_compact_json_length() {
        let payload = Payload::Structured(json!({"name": "Rex", "tags": [1, 2]}));
        assert_eq!(payload.content_length(), r#"{"name":"Rex","tags":[1,2]}"#.len());
    }

    #[test]
    fn json_string_counts_its_own_characters() {
        assert_eq!(Payload::Structured(json!("hello")).content_length(), 5);
    }

    #[test]
    fn text_length_counts_utf16_units() {
        assert_eq!(Payload::Text("héllo".to_string()).content_length(), 5);
        assert_eq!(Payload::Text("🐶".to_string()).content_length(), 2);
    }
}
