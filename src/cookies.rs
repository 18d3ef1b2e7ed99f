// Deferred-flush cookie handling
use axum::http::{header, HeaderMap, HeaderValue};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One outbound cookie. Renders to a `Set-Cookie` header value.
#[derive(Debug, Clone, PartialEq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub expires: Option<DateTime<Utc>>,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            expires: None,
            path: "/".to_string(),
            domain: None,
            secure: false,
            http_only: false,
        }
    }

    /// A deletion is an ordinary cookie with an expiry in the past, so it
    /// flows through the same flush point as every other write.
    pub fn expired(name: impl Into<String>) -> Self {
        let mut cookie = Self::new(name, "");
        cookie.expires = Some(DateTime::<Utc>::UNIX_EPOCH);
        cookie
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.expires, Some(at) if at <= Utc::now())
    }

    pub fn to_header_value(&self) -> String {
        let mut parts = vec![format!("{}={}", self.name, self.value)];
        if let Some(expires) = self.expires {
            parts.push(format!(
                "Expires={}",
                expires.format("%a, %d %b %Y %H:%M:%S GMT")
            ));
        }
        parts.push(format!("Path={}", self.path));
        if let Some(domain) = &self.domain {
            parts.push(format!("Domain={domain}"));
        }
        if self.secure {
            parts.push("Secure".to_string());
        }
        if self.http_only {
            parts.push("HttpOnly".to_string());
        }
        parts.join("; ")
    }
}

/// Outcome of a best-effort cookie read. `Unavailable` means the accessor
/// itself could not answer (not "cookie absent"); callers decide whether to
/// log it.
#[derive(Debug, Clone, PartialEq)]
pub enum CookieRead {
    Value(String),
    Missing,
    Unavailable,
}

impl CookieRead {
    pub fn value_or(self, default: &str) -> String {
        match self {
            CookieRead::Value(v) => v,
            _ => default.to_string(),
        }
    }
}

/// Per-request cookie state: the parsed inbound cookie map plus a queue of
/// outbound cookies. Queued cookies are written once, in order, when the
/// response is finalized; nothing here touches the transport response
/// directly.
#[derive(Debug, Default)]
pub struct CookieAccessor {
    inbound: HashMap<String, String>,
    queued: Vec<Cookie>,
}

impl CookieAccessor {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let inbound = headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(parse_cookie_header)
            .unwrap_or_default();
        Self {
            inbound,
            queued: Vec::new(),
        }
    }

    pub fn queue(&mut self, cookie: Cookie) {
        self.queued.push(cookie);
    }

    /// Queue a deletion for `name`.
    pub fn expire(&mut self, name: &str) {
        self.queue(Cookie::expired(name));
    }

    /// Read one cookie, queued values taking precedence over the inbound
    /// request. A queued deletion reads as absent.
    pub fn get(&self, name: &str) -> Option<String> {
        if let Some(cookie) = self.queued.iter().rev().find(|c| c.name == name) {
            if cookie.is_expired() {
                return None;
            }
            return Some(cookie.value.clone());
        }
        self.inbound.get(name).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Merged view of inbound and queued cookies, queued values winning.
    pub fn all(&self) -> HashMap<String, String> {
        let mut merged = self.inbound.clone();
        for cookie in &self.queued {
            if cookie.is_expired() {
                merged.remove(&cookie.name);
            } else {
                merged.insert(cookie.name.clone(), cookie.value.clone());
            }
        }
        merged
    }

    /// Drain the queue in queued order, keeping only the last cookie queued
    /// per name. Called exactly once, at response finalization.
    pub fn flush(&mut self) -> Vec<Cookie> {
        let queued = std::mem::take(&mut self.queued);
        let mut last_index: HashMap<String, usize> = HashMap::new();
        for (i, cookie) in queued.iter().enumerate() {
            last_index.insert(cookie.name.clone(), i);
        }
        queued
            .into_iter()
            .enumerate()
            .filter(|(i, cookie)| last_index.get(&cookie.name) == Some(i))
            .map(|(_, cookie)| cookie)
            .collect()
    }
}

/// Shared handle to one request's [`CookieAccessor`], cloneable into request
/// extensions. All reads degrade rather than panic.
#[derive(Clone, Default)]
pub struct CookieJar {
    inner: Arc<Mutex<CookieAccessor>>,
}

impl CookieJar {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CookieAccessor::from_headers(headers))),
        }
    }

    pub fn queue(&self, cookie: Cookie) {
        if let Ok(mut accessor) = self.inner.lock() {
            accessor.queue(cookie);
        }
    }

    pub fn expire(&self, name: &str) {
        if let Ok(mut accessor) = self.inner.lock() {
            accessor.expire(name);
        }
    }

    pub fn read(&self, name: &str) -> CookieRead {
        match self.inner.lock() {
            Ok(accessor) => match accessor.get(name) {
                Some(value) => CookieRead::Value(value),
                None => CookieRead::Missing,
            },
            Err(_) => CookieRead::Unavailable,
        }
    }

    pub fn has(&self, name: &str) -> bool {
        matches!(self.read(name), CookieRead::Value(_))
    }

    pub fn all(&self) -> HashMap<String, String> {
        self.inner
            .lock()
            .map(|accessor| accessor.all())
            .unwrap_or_default()
    }

    pub fn flush(&self) -> Vec<Cookie> {
        self.inner
            .lock()
            .map(|mut accessor| accessor.flush())
            .unwrap_or_default()
    }
}

/// Append every queued cookie to the response headers, in queue order.
pub fn write_set_cookie_headers(jar: &CookieJar, headers: &mut HeaderMap) {
    for cookie in jar.flush() {
        match HeaderValue::from_str(&cookie.to_header_value()) {
            Ok(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            Err(e) => {
                tracing::error!("skipping malformed cookie '{}': {}", cookie.name, e);
            }
        }
    }
}

fn parse_cookie_header(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}
