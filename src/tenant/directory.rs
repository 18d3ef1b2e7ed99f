use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

use super::model::Tenant;

/// Backing-store failure. Deliberately opaque: callers only need to know the
/// directory could not answer, not which query failed.
#[derive(Debug, Error)]
#[error("tenant store error: {0}")]
pub struct StoreError(pub String);

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError(e.to_string())
    }
}

/// Resolution failure taxonomy.
///
/// `NotFound` and `Disabled` collapse to the same client-visible outcome but
/// stay separate here so operators can tell misconfiguration from an
/// administratively disabled site. `Unavailable` is an outage and must never
/// be folded into either.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("no tenant bound to host '{0}'")]
    NotFound(String),

    #[error("tenant for host '{0}' is disabled")]
    Disabled(String),

    #[error("tenant directory unavailable: {0}")]
    Unavailable(#[from] StoreError),
}

/// Lookup seam between the directory and its persistence.
#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn fetch_by_host(&self, host: &str) -> Result<Option<Tenant>, StoreError>;
}

/// Production store backed by the shared tenants table.
pub struct PgTenantStore {
    pool: PgPool,
}

impl PgTenantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantStore for PgTenantStore {
    async fn fetch_by_host(&self, host: &str) -> Result<Option<Tenant>, StoreError> {
        let query = r#"
            SELECT
                id, name, hosts, admin_entry_token, config,
                resource_cdn, is_active, created_at, updated_at
            FROM tenants
            WHERE $1 = ANY(hosts)
        "#;

        let tenant = sqlx::query_as::<_, Tenant>(query)
            .bind(host)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tenant)
    }
}

/// In-memory store for tests and single-node demo deployments.
#[derive(Default)]
pub struct MemoryTenantStore {
    tenants: RwLock<HashMap<i64, Tenant>>,
}

impl MemoryTenantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, tenant: Tenant) {
        self.tenants.write().await.insert(tenant.id, tenant);
    }

    pub async fn remove(&self, id: i64) {
        self.tenants.write().await.remove(&id);
    }
}

#[async_trait]
impl TenantStore for MemoryTenantStore {
    async fn fetch_by_host(&self, host: &str) -> Result<Option<Tenant>, StoreError> {
        let tenants = self.tenants.read().await;
        Ok(tenants.values().find(|t| t.matches_host(host)).cloned())
    }
}

struct CachedTenant {
    tenant: Tenant,
    expires_at: Instant,
}

/// Host -> tenant lookup with a short-TTL cache in front of the store.
///
/// The cache is the only state shared across concurrent requests. Reads take
/// the read lock briefly; a miss releases every lock before hitting the
/// store. Token or host rotation must call `invalidate` so the old entry
/// never outlives the TTL bound.
pub struct TenantDirectory {
    store: Arc<dyn TenantStore>,
    cache: RwLock<HashMap<String, CachedTenant>>,
    ttl: Duration,
}

impl TenantDirectory {
    pub fn new(store: Arc<dyn TenantStore>, ttl: Duration) -> Self {
        Self {
            store,
            cache: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Resolve the tenant for a request host. Disabled tenants fail closed.
    pub async fn resolve(&self, host: &str) -> Result<Tenant, DirectoryError> {
        let host = normalize_host(host);

        // Fast path: fresh cache entry
        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(&host) {
                if entry.expires_at > Instant::now() {
                    return Ok(entry.tenant.clone());
                }
            }
        }

        let fetched = self.store.fetch_by_host(&host).await?;

        match fetched {
            Some(tenant) if tenant.is_active => {
                let mut cache = self.cache.write().await;
                cache.insert(
                    host,
                    CachedTenant {
                        tenant: tenant.clone(),
                        expires_at: Instant::now() + self.ttl,
                    },
                );
                Ok(tenant)
            }
            Some(tenant) => {
                tracing::warn!(tenant_id = tenant.id, host = %host, "tenant is disabled");
                Err(DirectoryError::Disabled(host))
            }
            // Misses are not cached: a freshly provisioned host must resolve
            // on its next request.
            None => Err(DirectoryError::NotFound(host)),
        }
    }

    /// Drop the cached entry for one host. Call whenever the tenant's
    /// admin_entry_token or host set changes.
    pub async fn invalidate(&self, host: &str) {
        self.cache.write().await.remove(&normalize_host(host));
    }

    pub async fn invalidate_all(&self) {
        self.cache.write().await.clear();
    }
}

fn normalize_host(host: &str) -> String {
    host.split(':')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}
