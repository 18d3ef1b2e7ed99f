use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::context::RequestContext;
use crate::error::ApiError;
use crate::tenant::DirectoryError;

/// Resolve the tenant for a route that requires one. Unknown and disabled
/// hosts get the uniform not-found response so probing hosts reveals nothing.
pub async fn resolve_site_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    resolve_site(state, request, next, true).await
}

/// Resolve the tenant if the host maps to one; continue with an empty
/// context otherwise. Directory outages still fail the request.
pub async fn resolve_site_optional_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    resolve_site(state, request, next, false).await
}

async fn resolve_site(
    state: AppState,
    mut request: Request,
    next: Next,
    tenant_required: bool,
) -> Result<Response, ApiError> {
    // A fresh context per request: never pooled, never reused across
    // requests on the same worker.
    let context = RequestContext::new();

    match request_host(&request) {
        Some(host) => match state.directory.resolve(&host).await {
            Ok(tenant) => {
                tracing::debug!(tenant_id = tenant.id, host = %host, "resolved tenant");
                context.bind(tenant).map_err(|e| {
                    tracing::error!("request context rebind rejected: {}", e);
                    ApiError::internal_server_error("Internal error")
                })?;
            }
            Err(DirectoryError::Unavailable(e)) => {
                // Outage, not attack noise: distinguishable for operators,
                // never folded into the uniform not-found bucket.
                tracing::error!(host = %host, "tenant directory unavailable: {}", e);
                return Err(ApiError::service_unavailable("Service temporarily unavailable"));
            }
            Err(DirectoryError::Disabled(_)) => {
                tracing::warn!(host = %host, "request for disabled tenant");
                if tenant_required {
                    return Err(ApiError::uniform_not_found());
                }
            }
            Err(DirectoryError::NotFound(_)) => {
                tracing::warn!(host = %host, "no tenant for host");
                if tenant_required {
                    return Err(ApiError::uniform_not_found());
                }
            }
        },
        None => {
            tracing::warn!("request without usable host header");
            if tenant_required {
                return Err(ApiError::uniform_not_found());
            }
        }
    }

    request.extensions_mut().insert(context);
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
