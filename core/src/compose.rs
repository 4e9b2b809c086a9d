//! URL composition and cookie parameters.
//!
//! Path parameters are substituted into `{name}` placeholders and query
//! parameters are appended with form encoding, the same encoding
//! `URLSearchParams` produces in a browser. Cookie parameters never reach the
//! URL: they are written to a `CookieStore` before dispatch.

use std::collections::BTreeMap;
use std::sync::Mutex;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tracing::debug;
use url::form_urlencoded;

use crate::error::TryOutError;

/// Encode everything that would change the meaning of a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Resolve `template` into a request URL.
///
/// Placeholders with no matching parameter are left untouched; the transport
/// will then fail on the URL, which the dispatcher reports like any other
/// network failure.
pub fn compose_url(
    template: &str,
    path_params: &[(String, String)],
    query_params: &[(String, String)],
) -> String {
    let mut url = template.to_string();
    for (name, value) in path_params {
        let placeholder = format!("{{{name}}}");
        let encoded = utf8_percent_encode(value, PATH_SEGMENT).to_string();
        url = url.replace(&placeholder, &encoded);
    }

    if query_params.is_empty() {
        return url;
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query_params)
        .finish();
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{query}")
}

/// Write-only side channel for cookie parameters.
pub trait CookieStore: Send + Sync {
    fn set(&self, name: &str, value: &str) -> Result<(), TryOutError>;
}

/// Write every cookie parameter to `store`, one cookie per entry.
///
/// Refused cookies are logged and skipped; the request still goes out.
pub fn set_cookie_params(store: &dyn CookieStore, cookies: &[(String, String)]) {
    for (name, value) in cookies {
        if let Err(e) = store.set(name, value) {
            debug!(cookie = %name, error = %e, "cookie not stored");
        }
    }
}

/// In-process cookie store shared between the session and a transport.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: Mutex<BTreeMap<String, String>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.cookies.lock().ok()?.get(name).cloned()
    }

    /// `Cookie` request header value for everything in the jar.
    pub fn cookie_header(&self) -> Option<String> {
        let cookies = self.cookies.lock().ok()?;
        if cookies.is_empty() {
            return None;
        }
        let pairs: Vec<String> = cookies.iter().map(|(k, v)| format!("{k}={v}")).collect();
        Some(pairs.join("; "))
    }
}

impl CookieStore for MemoryCookieJar {
    fn set(&self, name: &str, value: &str) -> Result<(), TryOutError> {
        if name.is_empty() || !name.chars().all(is_token_char) {
            return Err(TryOutError::Cookie(format!("invalid cookie name {name:?}")));
        }
        if value.chars().any(|c| c == ';' || c.is_control()) {
            return Err(TryOutError::Cookie(format!("invalid value for cookie {name}")));
        }
        let mut cookies = self
            .cookies
            .lock()
            .map_err(|_| TryOutError::Cookie("cookie jar poisoned".to_string()))?;
        cookies.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_graphic() && !matches!(c, ';' | '=' | ',' | '"' | '\\' | '(' | ')' | '<' | '>' | '@' | ':' | '/' | '[' | ']' | '?' | '{' | '}')
}
