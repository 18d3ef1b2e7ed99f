pub mod admin;

use axum::{extract::Extension, response::Json};
use serde_json::{json, Value};

use crate::context::RequestContext;
use crate::error::ApiError;

pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "hive-api",
            "version": env!("CARGO_PKG_VERSION")
        }
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "success": true, "data": { "status": "ok" } }))
}

/// Uniform fallback for unmapped routes. The admin entry gate returns the
/// same body, which is what makes token probing indistinguishable from
/// hitting a route that does not exist.
pub async fn not_found() -> ApiError {
    ApiError::uniform_not_found()
}

/// Public site info. The tenant is optional here: an unknown host gets a
/// null tenant, not an error.
pub async fn site_info(Extension(context): Extension<RequestContext>) -> Json<Value> {
    let tenant = context.tenant().map(|t| {
        json!({
            "id": t.id,
            "name": t.name,
            "title": context.config("site.title", json!(t.name)),
            "resource_cdn": t.resource_cdn,
        })
    });

    Json(json!({ "success": true, "data": { "tenant": tenant } }))
}
