// Not every test binary uses every helper
#![allow(dead_code)]

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use hive_api::app::{router, AppState};
use hive_api::session::{MemorySessionStore, SessionStore};
use hive_api::tenant::{MemoryTenantStore, Tenant, TenantDirectory, TenantStore};

/// In-process app plus handles to its backing stores, so tests can rotate
/// tokens and inspect session records directly.
pub struct TestApp {
    pub router: Router,
    pub tenants: Arc<MemoryTenantStore>,
    pub directory: Arc<TenantDirectory>,
    pub sessions: Arc<MemorySessionStore>,
}

pub fn fixture_tenant(id: i64, host: &str, token: &str) -> Tenant {
    Tenant {
        id,
        name: format!("tenant-{id}"),
        hosts: vec![host.to_string()],
        admin_entry_token: token.to_string(),
        config: json!({ "site": { "title": format!("Site {id}") } }),
        resource_cdn: None,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Two fixture tenants: 7 on a.example.com (token xyz123) and 8 on
/// b.example.com (token abc999).
pub async fn test_app() -> TestApp {
    test_app_with_ttl(Duration::from_secs(300)).await
}

pub async fn test_app_with_ttl(ttl: Duration) -> TestApp {
    let tenants = Arc::new(MemoryTenantStore::new());
    tenants.insert(fixture_tenant(7, "a.example.com", "xyz123")).await;
    tenants.insert(fixture_tenant(8, "b.example.com", "abc999")).await;

    let store: Arc<dyn TenantStore> = tenants.clone();
    let directory = Arc::new(TenantDirectory::new(store, ttl));
    let sessions = Arc::new(MemorySessionStore::new());
    let session_store: Arc<dyn SessionStore> = sessions.clone();

    let router = router(AppState {
        directory: directory.clone(),
        sessions: session_store,
    });

    TestApp {
        router,
        tenants,
        directory,
        sessions,
    }
}

pub async fn request(
    app: &TestApp,
    method: &str,
    host: &str,
    path: &str,
    cookie: Option<&str>,
) -> Result<(StatusCode, HeaderMap, Value)> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::HOST, host);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let response = app
        .router
        .clone()
        .oneshot(builder.body(Body::empty())?)
        .await?;

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await?.to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, headers, body))
}

pub async fn get(app: &TestApp, host: &str, path: &str) -> Result<(StatusCode, HeaderMap, Value)> {
    request(app, "GET", host, path, None).await
}

pub fn set_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// The session id carried by the first session Set-Cookie on a response.
pub fn session_cookie_value(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    set_cookies(headers).into_iter().find_map(|raw| {
        let (pair, _) = raw.split_once(';').unwrap_or((raw.as_str(), ""));
        let (name, value) = pair.split_once('=')?;
        (name == cookie_name).then(|| value.to_string())
    })
}
