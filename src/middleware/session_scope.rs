use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::context::RequestContext;
use crate::error::ApiError;
use crate::session::{ScopedSession, SessionScope};

/// Derive the tenant-scoped session parameters for this request and hand
/// them to the downstream session layer through request extensions.
///
/// The scope is request-local only. Nothing here mutates a shared default:
/// a reused worker starts the next request with no scope at all, so one
/// tenant's cookie domain or namespace can never bleed into another
/// tenant's request.
pub async fn bind_session_scope_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let tenant = request
        .extensions()
        .get::<RequestContext>()
        .and_then(|ctx| ctx.tenant().cloned());

    let Some(tenant) = tenant else {
        // Pipeline misordering: the resolver must run first. Fail loudly in
        // debug builds, fail closed in release.
        debug_assert!(false, "session scope requested before tenant resolution");
        tracing::error!("session scope requested before tenant resolution");
        return Err(ApiError::internal_server_error("Internal error"));
    };

    let cookie_domain = request_host(&request)
        .or_else(|| tenant.hosts.first().cloned())
        .unwrap_or_default();

    let scope = SessionScope {
        namespace: tenant.id.to_string(),
        cookie_domain,
    };
    tracing::debug!(
        tenant_id = tenant.id,
        namespace = %scope.namespace,
        "bound session scope"
    );

    let session = ScopedSession::new(state.sessions.clone(), scope.clone());
    request.extensions_mut().insert(scope);
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

fn request_host(request: &Request) -> Option<String> {
    let raw = request.headers().get(header::HOST)?.to_str().ok()?;
    let host = raw.split(':').next()?.trim().to_ascii_lowercase();
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}
