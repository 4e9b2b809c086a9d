//! Verify request building and response projection against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Each vector file describes inputs and the expected result. Bodies that are
//! JSON are compared as strings on purpose: key order must survive encoding.

use tryout_core::{
    classify, project, Content, HttpMethod, HttpResponse, OperationDescriptor, OutcomeKind,
    Payload, RequestBuilder, RequestInput, ResponseCode, TryOutConfig,
};

const BASE_URL: &str = "http://localhost:3000";

fn pairs(value: &serde_json::Value) -> Vec<(String, String)> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect()
}

fn parse_kind(s: &str) -> OutcomeKind {
    match s {
        "success" => OutcomeKind::Success,
        "neutral" => OutcomeKind::Neutral,
        "error" => OutcomeKind::Error,
        other => panic!("unknown outcome kind: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

#[test]
fn build_test_vectors() {
    let raw = include_str!("../../test-vectors/build.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let builder = RequestBuilder::new(BASE_URL);
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let operation: OperationDescriptor = serde_json::from_value(case["operation"].clone()).unwrap();
        let input: RequestInput = serde_json::from_value(case["input"].clone()).unwrap();
        let expected = &case["expected_request"];

        let req = builder.build(&operation, &input).unwrap();
        let method: HttpMethod = expected["method"].as_str().unwrap().parse().unwrap();
        assert_eq!(req.method, method, "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected["url"].as_str().unwrap()), "{name}: url");
        assert_eq!(req.headers, pairs(&expected["headers"]), "{name}: headers");
        assert_eq!(req.body.as_deref(), expected["body"].as_str(), "{name}: body");
    }
}

// ---------------------------------------------------------------------------
// Classify + project
// ---------------------------------------------------------------------------

#[test]
fn classify_test_vectors() {
    let raw = include_str!("../../test-vectors/classify.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let limit = TryOutConfig::default().max_content_length;
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: sim["content_type"]
                .as_str()
                .map(|ct| vec![("Content-Type".to_string(), ct.to_string())])
                .unwrap_or_default(),
            body: sim["body"].as_str().unwrap().to_string(),
        };
        let expected = &case["expected"];

        let outcome = project(classify(response), limit);
        assert_eq!(outcome.kind, parse_kind(expected["kind"].as_str().unwrap()), "{name}: kind");
        assert_eq!(
            outcome.code,
            ResponseCode::Status(expected["code"].as_u64().unwrap() as u16),
            "{name}: code"
        );

        let payload = match outcome.content {
            Content::Payload(payload) => payload,
            other => panic!("{name}: expected a payload, got {other:?}"),
        };
        match expected["format"].as_str().unwrap() {
            "text" => assert_eq!(
                payload,
                Payload::Text(expected["content"].as_str().unwrap().to_string()),
                "{name}: text content"
            ),
            "structured" => assert_eq!(
                payload,
                Payload::Structured(expected["content"].clone()),
                "{name}: structured content"
            ),
            other => panic!("{name}: unknown format: {other}"),
        }
    }
}
