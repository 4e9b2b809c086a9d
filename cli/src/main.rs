//! `tryout`: run one documented operation from the command line.
//!
//! Stands in for the documentation UI: it builds the operation from flags,
//! follows the session state through its watch channel and prints the final
//! outcome as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tryout_core::{
    HttpMethod, MemoryCookieJar, OperationDescriptor, RequestBody, RequestBodyMeta,
    RequestBuilder, RequestInput, TryOutConfig, TryOutSession, UreqTransport,
};

#[derive(Parser, Debug)]
#[command(name = "tryout", about = "Execute an OpenAPI operation and show the outcome")]
struct Args {
    /// HTTP verb of the operation (get, post, put, ...)
    method: HttpMethod,

    /// Path template, e.g. /pets/{id}
    path: String,

    /// Server base URL
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    base_url: String,

    /// Operation identifier used in logs
    #[arg(long, default_value = "operation")]
    operation_id: String,

    /// Path parameter, NAME=VALUE
    #[arg(short = 'p', long = "path-param", value_parser = parse_pair)]
    path_params: Vec<(String, String)>,

    /// Query parameter, NAME=VALUE
    #[arg(short = 'q', long = "query", value_parser = parse_pair)]
    query_params: Vec<(String, String)>,

    /// Request header, NAME=VALUE
    #[arg(short = 'H', long = "header", value_parser = parse_pair)]
    headers: Vec<(String, String)>,

    /// Cookie parameter, NAME=VALUE
    #[arg(short = 'c', long = "cookie", value_parser = parse_pair)]
    cookies: Vec<(String, String)>,

    /// Request body. Parsed as JSON when possible, otherwise sent as-is.
    #[arg(short = 'd', long)]
    body: Option<String>,

    /// Selected request-body media type
    #[arg(long)]
    media_type: Option<String>,

    /// TOML file with session settings
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_pair(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => bail!("expected NAME=VALUE, got {raw:?}"),
    }
}

fn parse_body(raw: String) -> RequestBody {
    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(value) if value.is_object() || value.is_array() => RequestBody::Json(value),
        _ => RequestBody::Raw(raw),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => TryOutConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => TryOutConfig::default(),
    };

    let mut operation = OperationDescriptor::new(&args.operation_id, args.method, &args.path);
    if let Some(media_type) = &args.media_type {
        operation = operation.with_request_body(RequestBodyMeta::new([media_type.clone()]));
    }

    let input = RequestInput {
        headers: args.headers,
        query_params: args.query_params,
        path_params: args.path_params,
        cookie_params: args.cookies,
        body: args.body.map(parse_body),
    };

    let session = TryOutSession::new(
        operation,
        RequestBuilder::new(&args.base_url),
        Arc::new(UreqTransport::new(Arc::new(MemoryCookieJar::new()))),
    )
    .with_config(config);

    let mut rx = session.subscribe();
    let watcher = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let pending = rx.borrow_and_update().pending;
            info!(pending, "state changed");
        }
    });

    info!(operation = %session.operation().id, "invoking");
    let outcome = session.invoke(input).await;
    drop(session);
    watcher.await.context("state watcher panicked")?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
