//! Blocking `ureq` transport driven from the async session.
//!
//! # Design
//! ureq is synchronous, so each request runs on tokio's blocking pool and the
//! session awaits the join handle. Status codes are never turned into errors
//! (`http_status_as_error(false)`): a 404 is a response like any other and is
//! classified downstream. Bodies are read in full and decoded lossily, the
//! way a browser's `text()` never fails on bad bytes. Cookies written by the
//! session are sent from the transport's `MemoryCookieJar`, which it hands to
//! the session through `Transport::cookie_store`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use ureq::Agent;

use crate::compose::{CookieStore, MemoryCookieJar};
use crate::dispatch::Transport;
use crate::error::TryOutError;
use crate::http::{HttpMethod, HttpResponse, TransportRequest};

#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
    cookies: Arc<MemoryCookieJar>,
}

impl UreqTransport {
    pub fn new(cookies: Arc<MemoryCookieJar>) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent, cookies }
    }

    fn execute_blocking(&self, request: TransportRequest) -> Result<HttpResponse, TryOutError> {
        let cookie = self.cookies.cookie_header();
        let url = request.url.as_str();
        let headers = request
            .headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(cookie.as_deref().map(|c| ("Cookie", c)));

        let result = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(url), headers).call(),
            HttpMethod::Head => with_headers(self.agent.head(url), headers).call(),
            HttpMethod::Options => with_headers(self.agent.options(url), headers).call(),
            HttpMethod::Trace => with_headers(self.agent.trace(url), headers).call(),
            HttpMethod::Delete => {
                let builder = with_headers(self.agent.delete(url), headers);
                match request.body {
                    Some(body) => builder.force_send_body().send(body),
                    None => builder.call(),
                }
            }
            HttpMethod::Post => send_optional(with_headers(self.agent.post(url), headers), request.body),
            HttpMethod::Put => send_optional(with_headers(self.agent.put(url), headers), request.body),
            HttpMethod::Patch => {
                send_optional(with_headers(self.agent.patch(url), headers), request.body)
            }
        };
        let mut response = result.map_err(|e| TryOutError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        // No size cap: oversized payloads are replaced after classification.
        let bytes = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| TryOutError::Transport(e.to_string()))?;
        debug!(status, bytes = bytes.len(), "response received");
        let body = String::from_utf8_lossy(&bytes).into_owned();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, request: TransportRequest) -> Result<HttpResponse, TryOutError> {
        let transport = self.clone();
        tokio::task::spawn_blocking(move || transport.execute_blocking(request))
            .await
            .map_err(|e| TryOutError::Transport(e.to_string()))?
    }

    fn cookie_store(&self) -> Option<Arc<dyn CookieStore>> {
        Some(self.cookies.clone())
    }
}

fn with_headers<'a, B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: impl Iterator<Item = (&'a str, &'a str)>,
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name, value);
    }
    builder
}

fn send_optional(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<String>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body),
        None => builder.send_empty(),
    }
}
