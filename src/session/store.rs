use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum SessionError {
    /// A session operation was attempted without a tenant namespace. This is
    /// a programming error in the pipeline, not a client condition: an
    /// unscoped session read is exactly the cross-tenant leak this store
    /// exists to prevent, so it fails closed instead of defaulting.
    #[error("session operation attempted without a tenant scope")]
    MissingTenantScope,

    #[error("session backend error: {0}")]
    Backend(String),
}

/// Build the storage key for one session record.
///
/// The tenant namespace is part of the key format itself, so a lookup keyed
/// only by session id cannot exist. Two tenants reusing the same raw session
/// id produce disjoint keys.
pub fn record_key(namespace: &str, session_id: &str) -> Result<String, SessionError> {
    if namespace.is_empty() {
        return Err(SessionError::MissingTenantScope);
    }
    Ok(format!("s:{namespace}:{session_id}"))
}

/// Tenant-partitioned key/value session backend.
///
/// Every operation requires a non-empty namespace; implementations must key
/// records through [`record_key`] so partitions can never collide.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, namespace: &str, session_id: &str) -> Result<Option<Value>, SessionError>;

    async fn set(
        &self,
        namespace: &str,
        session_id: &str,
        value: Value,
        ttl: Duration,
    ) -> Result<(), SessionError>;

    async fn destroy(&self, namespace: &str, session_id: &str) -> Result<(), SessionError>;
}

struct StoredRecord {
    value: Value,
    expires_at: Instant,
}

/// In-memory session backend with lazy expiry, for tests and single-node
/// deployments. Last write wins per key; different tenants never contend
/// because their keys are disjoint.
#[derive(Default)]
pub struct MemorySessionStore {
    records: RwLock<HashMap<String, StoredRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, namespace: &str, session_id: &str) -> Result<Option<Value>, SessionError> {
        let key = record_key(namespace, session_id)?;

        {
            let records = self.records.read().await;
            match records.get(&key) {
                Some(record) if record.expires_at > Instant::now() => {
                    return Ok(Some(record.value.clone()))
                }
                Some(_) => {} // expired, fall through to reap
                None => return Ok(None),
            }
        }

        self.records.write().await.remove(&key);
        Ok(None)
    }

    async fn set(
        &self,
        namespace: &str,
        session_id: &str,
        value: Value,
        ttl: Duration,
    ) -> Result<(), SessionError> {
        let key = record_key(namespace, session_id)?;
        let record = StoredRecord {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.records.write().await.insert(key, record);
        Ok(())
    }

    async fn destroy(&self, namespace: &str, session_id: &str) -> Result<(), SessionError> {
        let key = record_key(namespace, session_id)?;
        self.records.write().await.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn record_key_embeds_namespace() {
        assert_eq!(record_key("7", "abc").unwrap(), "s:7:abc");
    }

    #[test]
    fn empty_namespace_is_rejected() {
        assert!(matches!(
            record_key("", "abc"),
            Err(SessionError::MissingTenantScope)
        ));
    }

    #[tokio::test]
    async fn round_trip() {
        let store = MemorySessionStore::new();
        store.set("7", "abc", json!({"user": 1}), TTL).await.unwrap();
        assert_eq!(store.get("7", "abc").await.unwrap(), Some(json!({"user": 1})));
    }

    #[tokio::test]
    async fn same_session_id_is_absent_under_other_namespace() {
        let store = MemorySessionStore::new();
        store.set("7", "abc", json!({"user": 1}), TTL).await.unwrap();

        // A forged or reused raw session id must not cross tenants
        assert_eq!(store.get("8", "abc").await.unwrap(), None);
    }

    #[tokio::test]
    async fn operations_without_namespace_fail() {
        let store = MemorySessionStore::new();
        assert!(matches!(
            store.get("", "abc").await,
            Err(SessionError::MissingTenantScope)
        ));
        assert!(matches!(
            store.set("", "abc", json!(1), TTL).await,
            Err(SessionError::MissingTenantScope)
        ));
        assert!(matches!(
            store.destroy("", "abc").await,
            Err(SessionError::MissingTenantScope)
        ));
    }

    #[tokio::test]
    async fn destroy_removes_only_the_scoped_record() {
        let store = MemorySessionStore::new();
        store.set("7", "abc", json!(1), TTL).await.unwrap();
        store.set("8", "abc", json!(2), TTL).await.unwrap();

        store.destroy("7", "abc").await.unwrap();
        assert_eq!(store.get("7", "abc").await.unwrap(), None);
        assert_eq!(store.get("8", "abc").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn expired_records_read_as_absent() {
        let store = MemorySessionStore::new();
        store
            .set("7", "abc", json!(1), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(store.get("7", "abc").await.unwrap(), None);
    }

    #[tokio::test]
    async fn last_write_wins_within_a_namespace() {
        let store = MemorySessionStore::new();
        store.set("7", "abc", json!(1), TTL).await.unwrap();
        store.set("7", "abc", json!(2), TTL).await.unwrap();
        assert_eq!(store.get("7", "abc").await.unwrap(), Some(json!(2)));
    }
}
