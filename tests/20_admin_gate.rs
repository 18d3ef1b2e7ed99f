mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn correct_entry_token_passes_the_gate() -> Result<()> {
    let app = common::test_app().await;
    let (status, _, body) =
        common::get(&app, "a.example.com", "/admin/xyz123/dashboard").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["dashboard_url"], json!("/admin/xyz123/dashboard"));
    assert_eq!(body["data"]["admin_root"], json!("/admin/xyz123"));
    Ok(())
}

#[tokio::test]
async fn wrong_token_is_identical_to_unmapped_route() -> Result<()> {
    let app = common::test_app().await;

    let (gate_status, _, gate_body) =
        common::get(&app, "a.example.com", "/admin/wrong/dashboard").await?;
    let (route_status, _, route_body) =
        common::get(&app, "a.example.com", "/no/such/route").await?;

    assert_eq!(gate_status, StatusCode::NOT_FOUND);
    assert_eq!((gate_status, gate_body), (route_status, route_body));
    Ok(())
}

#[tokio::test]
async fn another_tenants_token_does_not_cross_hosts() -> Result<()> {
    let app = common::test_app().await;

    // Tenant 8's valid token presented on tenant 7's host
    let (status, _, _) =
        common::get(&app, "a.example.com", "/admin/abc999/dashboard").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn entry_segment_is_never_defaulted() -> Result<()> {
    let app = common::test_app().await;

    // No entry segment at all: there is no implicit "admin" fallback
    for path in ["/admin", "/admin/", "/admin/xyz123"] {
        let (status, _, body) = common::get(&app, "a.example.com", path).await?;
        assert_eq!(status, StatusCode::NOT_FOUND, "path {path}");
        assert_eq!(body["code"], json!("NOT_FOUND"), "path {path}");
    }
    Ok(())
}

#[tokio::test]
async fn token_rotation_invalidates_old_admin_urls() -> Result<()> {
    let app = common::test_app().await;

    // Warm the directory cache with the old token
    let (status, _, _) = common::get(&app, "a.example.com", "/admin/xyz123/dashboard").await?;
    assert_eq!(status, StatusCode::OK);

    // Rotate and invalidate, as the provisioning surface would
    app.tenants
        .insert(common::fixture_tenant(7, "a.example.com", "rot456"))
        .await;
    app.directory.invalidate("a.example.com").await;

    let (old_status, _, old_body) =
        common::get(&app, "a.example.com", "/admin/xyz123/dashboard").await?;
    let (unknown_status, _, unknown_body) =
        common::get(&app, "nope.example.com", "/admin/xyz123/dashboard").await?;
    assert_eq!(old_status, StatusCode::NOT_FOUND);
    assert_eq!((old_status, old_body), (unknown_status, unknown_body));

    let (new_status, _, _) =
        common::get(&app, "a.example.com", "/admin/rot456/dashboard").await?;
    assert_eq!(new_status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn token_rotation_lands_within_the_ttl_bound() -> Result<()> {
    // Zero TTL = every request re-reads the store, no invalidate call needed
    let app = common::test_app_with_ttl(Duration::ZERO).await;

    let (status, _, _) = common::get(&app, "a.example.com", "/admin/xyz123/dashboard").await?;
    assert_eq!(status, StatusCode::OK);

    app.tenants
        .insert(common::fixture_tenant(7, "a.example.com", "rot456"))
        .await;

    let (old_status, _, _) =
        common::get(&app, "a.example.com", "/admin/xyz123/dashboard").await?;
    assert_eq!(old_status, StatusCode::NOT_FOUND);

    let (new_status, _, _) =
        common::get(&app, "a.example.com", "/admin/rot456/dashboard").await?;
    assert_eq!(new_status, StatusCode::OK);
    Ok(())
}
