use axum::{
    middleware,
    routing::{delete, get},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::middleware::{
    admin_entry_gate_middleware, bind_session_scope_middleware, flush_cookies_middleware,
    resolve_site_middleware, resolve_site_optional_middleware,
};
use crate::session::SessionStore;
use crate::tenant::TenantDirectory;

/// Shared handles for the request pipeline. Everything request-scoped
/// (context, scope, cookie jar) lives in request extensions instead.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<TenantDirectory>,
    pub sessions: Arc<dyn SessionStore>,
}

/// Assemble the full router.
///
/// Admin stage order is strict: site resolver, then entry gate, then session
/// scope binder, then the handler. `route_layer` wraps bottom-up, so the
/// resolver is added last.
pub fn router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/admin/:entry/dashboard", get(handlers::admin::dashboard))
        .route("/admin/:entry/session", delete(handlers::admin::logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            bind_session_scope_middleware,
        ))
        .route_layer(middleware::from_fn(admin_entry_gate_middleware))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_site_middleware,
        ));

    let site_routes = Router::new()
        .route("/site", get(handlers::site_info))
        .route_layer(middleware::from_fn_with_state(
            state,
            resolve_site_optional_middleware,
        ));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(site_routes)
        .merge(admin_routes)
        // Unmapped routes share the exact body the admin gate produces
        .fallback(handlers::not_found)
        // Global middleware
        .layer(middleware::from_fn(flush_cookies_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
