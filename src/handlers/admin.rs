// Admin surface behind the entry gate
use axum::{extract::Extension, response::Json};
use chrono::Utc;
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

use crate::config::config;
use crate::context::RequestContext;
use crate::cookies::{CookieJar, CookieRead};
use crate::error::ApiError;
use crate::session::ScopedSession;

/// GET /admin/:entry/dashboard
///
/// Establishes (or refreshes) the tenant-scoped admin session: the record is
/// written under the tenant namespace and the cookie is queued with the
/// tenant-derived domain. The gate has already vouched for the entry token.
pub async fn dashboard(
    Extension(context): Extension<RequestContext>,
    Extension(session): Extension<ScopedSession>,
    Extension(cookies): Extension<CookieJar>,
) -> Result<Json<Value>, ApiError> {
    let tenant = context.tenant().cloned().ok_or_else(|| {
        tracing::error!("admin handler reached without resolved tenant");
        ApiError::internal_server_error("Internal error")
    })?;

    let session_cfg = &config().session;
    let session_id = match cookies.read(&session_cfg.cookie_name) {
        CookieRead::Value(id) => id,
        CookieRead::Missing => Uuid::new_v4().simple().to_string(),
        CookieRead::Unavailable => {
            tracing::warn!(tenant_id = tenant.id, "cookie jar unavailable, issuing fresh session id");
            Uuid::new_v4().simple().to_string()
        }
    };

    let record = json!({
        "tenant_id": tenant.id,
        "realm": "admin",
        "seen_at": Utc::now().to_rfc3339(),
    });
    session
        .set(
            &session_id,
            record,
            Duration::from_secs(session_cfg.ttl_secs),
        )
        .await
        .map_err(|e| {
            tracing::error!(tenant_id = tenant.id, "session write failed: {}", e);
            ApiError::internal_server_error("Internal error")
        })?;

    cookies.queue(session.session_cookie(&session_id));

    Ok(Json(json!({
        "success": true,
        "data": {
            "tenant_id": tenant.id,
            "name": tenant.name,
            "title": context.config("site.title", json!(tenant.name)),
            "session_namespace": session.scope().namespace,
            "dashboard_url": tenant.admin_path("dashboard"),
            "admin_root": tenant.admin_path(""),
        }
    })))
}

/// DELETE /admin/:entry/session
///
/// Destroys the scoped session record and queues the cookie deletion through
/// the same flush point every other cookie write uses.
pub async fn logout(
    Extension(session): Extension<ScopedSession>,
    Extension(cookies): Extension<CookieJar>,
) -> Result<Json<Value>, ApiError> {
    let session_cfg = &config().session;

    if let CookieRead::Value(session_id) = cookies.read(&session_cfg.cookie_name) {
        session.destroy(&session_id).await.map_err(|e| {
            tracing::error!("session destroy failed: {}", e);
            ApiError::internal_server_error("Internal error")
        })?;
    }
    cookies.expire(&session_cfg.cookie_name);

    Ok(Json(json!({ "success": true, "data": { "logged_out": true } })))
}
