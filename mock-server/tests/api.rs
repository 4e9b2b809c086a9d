use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Pet, BINARY_BODY};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn content_type(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(http::header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- pets ---

#[tokio::test]
async fn list_pets_empty() {
    let resp = app().oneshot(get("/pets")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let pets: Vec<Pet> = body_json(resp).await;
    assert!(pets.is_empty());
}

#[tokio::test]
async fn create_pet_returns_201() {
    let resp = app()
        .oneshot(json_request("POST", "/pets", r#"{"name":"Rex"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let pet: Pet = body_json(resp).await;
    assert_eq!(pet.id, 1);
    assert_eq!(pet.name, "Rex");
    assert!(pet.tag.is_none());
}

#[tokio::test]
async fn create_pet_without_name_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/pets", r#"{"tag":"dog"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_pet_not_found() {
    let resp = app().oneshot(get("/pets/7")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_pet_bad_id_returns_400() {
    let resp = app().oneshot(get("/pets/rex")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pet_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    for name in ["Rex", "Fido", "Tom"] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request("POST", "/pets", &format!(r#"{{"name":"{name}"}}"#)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    // list honours limit
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/pets?limit=2"))
        .await
        .unwrap();
    let pets: Vec<Pet> = body_json(resp).await;
    assert_eq!(pets.len(), 2);
    assert_eq!(pets[0].name, "Rex");

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/pets/2"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let pet: Pet = body_json(resp).await;
    assert_eq!(pet.name, "Fido");

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri("/pets/2")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // get after delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/pets/2"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- content-type fixtures ---

#[tokio::test]
async fn health_is_plain_text() {
    let resp = app().oneshot(get("/health")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(content_type(&resp).starts_with("text/plain"));
    assert_eq!(&body_bytes(resp).await[..], b"ok");
}

#[tokio::test]
async fn mislabeled_claims_json_but_is_not() {
    let resp = app().oneshot(get("/mislabeled")).await.unwrap();

    assert_eq!(content_type(&resp), "application/json");
    let bytes = body_bytes(resp).await;
    assert!(serde_json::from_slice::<serde_json::Value>(&bytes).is_err());
}

#[tokio::test]
async fn binary_is_not_utf8() {
    let resp = app().oneshot(get("/binary")).await.unwrap();

    assert_eq!(content_type(&resp), "application/octet-stream");
    let bytes = body_bytes(resp).await;
    assert_eq!(&bytes[..], BINARY_BODY);
    assert!(std::str::from_utf8(&bytes).is_err());
}

#[tokio::test]
async fn large_payload_has_requested_length() {
    let resp = app().oneshot(get("/large?size=10001")).await.unwrap();

    assert_eq!(content_type(&resp), "application/json");
    let bytes = body_bytes(resp).await;
    assert_eq!(bytes.len(), 10_001);
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(value["data"].is_string());
}

#[tokio::test]
async fn echo_reflects_method_query_and_cookie() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/echo?limit=5")
                .header(http::header::CONTENT_TYPE, "text/plain")
                .header(http::header::COOKIE, "session=abc")
                .body("hello".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echoed: serde_json::Value = body_json(resp).await;
    assert_eq!(echoed["method"], "PATCH");
    assert_eq!(echoed["path"], "/echo");
    assert_eq!(echoed["query"], "limit=5");
    assert_eq!(echoed["content_type"], "text/plain");
    assert_eq!(echoed["cookie"], "session=abc");
    assert_eq!(echoed["body"], "hello");
}
