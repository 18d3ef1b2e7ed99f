use chrono::Utc;
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

use hive_api::app::{router, AppState};
use hive_api::config::config;
use hive_api::session::{MemorySessionStore, SessionStore};
use hive_api::tenant::{MemoryTenantStore, PgTenantStore, Tenant, TenantDirectory, TenantStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, APP_ENV, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let cfg = config();
    tracing::info!("Starting hive-api in {:?} mode", cfg.environment);

    let store: Arc<dyn TenantStore> = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = PgPoolOptions::new().max_connections(10).connect(&url).await?;
            Arc::new(PgTenantStore::new(pool))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, serving the built-in demo tenant from memory");
            let memory = MemoryTenantStore::new();
            memory.insert(demo_tenant()).await;
            Arc::new(memory)
        }
    };

    let directory = Arc::new(TenantDirectory::new(
        store,
        Duration::from_secs(cfg.directory.cache_ttl_secs),
    ));
    let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());

    let app = router(AppState {
        directory,
        sessions,
    });

    // Allow tests or deployments to override port via env
    let port = std::env::var("HIVE_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("hive-api listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn demo_tenant() -> Tenant {
    Tenant {
        id: 1,
        name: "Demo Site".to_string(),
        hosts: vec!["localhost".to_string(), "127.0.0.1".to_string()],
        admin_entry_token: "dev-entry".to_string(),
        config: json!({ "site": { "title": "Hive Demo" } }),
        resource_cdn: None,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
