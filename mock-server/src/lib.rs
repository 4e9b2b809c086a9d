use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

#[derive(Deserialize)]
pub struct NewPet {
    pub name: String,
    pub tag: Option<String>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct LargeParams {
    #[serde(default = "default_large_size")]
    pub size: usize,
}

fn default_large_size() -> usize {
    20_000
}

#[derive(Default)]
pub struct Store {
    pets: RwLock<BTreeMap<u64, Pet>>,
    next_id: AtomicU64,
}

pub type Db = Arc<Store>;

pub fn app() -> Router {
    let db: Db = Arc::new(Store::default());
    Router::new()
        .route("/pets", get(list_pets).post(create_pet))
        .route("/pets/{id}", get(get_pet).delete(delete_pet))
        .route("/health", get(health))
        .route("/mislabeled", get(mislabeled))
        .route("/large", get(large))
        .route("/binary", get(binary))
        .route("/echo", any(echo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!("mock server listening on {addr}");
    }
    axum::serve(listener, app()).await
}

async fn list_pets(State(db): State<Db>, Query(params): Query<ListParams>) -> Json<Vec<Pet>> {
    let pets = db.pets.read().await;
    let limit = params.limit.unwrap_or(usize::MAX);
    Json(pets.values().take(limit).cloned().collect())
}

async fn create_pet(State(db): State<Db>, Json(input): Json<NewPet>) -> (StatusCode, Json<Pet>) {
    let id = db.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    let pet = Pet {
        id,
        name: input.name,
        tag: input.tag,
    };
    db.pets.write().await.insert(id, pet.clone());
    (StatusCode::CREATED, Json(pet))
}

async fn get_pet(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Pet>, StatusCode> {
    let pets = db.pets.read().await;
    pets.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn delete_pet(State(db): State<Db>, Path(id): Path<u64>) -> StatusCode {
    match db.pets.write().await.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

/// Served by `/binary`: "hi" followed by two bytes no UTF-8 text contains.
pub const BINARY_BODY: &[u8] = &[0x68, 0x69, 0xff, 0xfe];

async fn health() -> &'static str {
    "ok"
}

/// Declares JSON but sends plain text.
async fn mislabeled() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], "definitely not json")
}

/// A JSON document whose compact form is exactly `size` characters long.
async fn large(Query(params): Query<LargeParams>) -> impl IntoResponse {
    let overhead = r#"{"data":""}"#.len();
    let data = "x".repeat(params.size.saturating_sub(overhead));
    let body = json!({ "data": data }).to_string();
    ([(header::CONTENT_TYPE, "application/json")], body)
}

/// Bytes that are not valid UTF-8.
async fn binary() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        BINARY_BODY.to_vec(),
    )
}

/// Reflects the request back so clients can check what they sent.
async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<serde_json::Value> {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "content_type": header_value(header::CONTENT_TYPE),
        "cookie": header_value(header::COOKIE),
        "body": body,
    }))
}
