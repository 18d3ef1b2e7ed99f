use chrono::{Duration as ChronoDuration, Utc};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::config;
use crate::cookies::Cookie;

use super::store::{SessionError, SessionStore};

/// Per-request session parameters computed by the scope binder.
///
/// Lives only in one request's extensions. Never stored in any process-wide
/// default: the next request on this worker may belong to a different tenant.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionScope {
    /// Mandatory partition for every session read/write in this request.
    pub namespace: String,
    /// Cookie domain derived from the tenant's host, never a global default.
    pub cookie_domain: String,
}

/// Per-request session handle with the tenant namespace baked in, so
/// handlers cannot pass the wrong one.
#[derive(Clone)]
pub struct ScopedSession {
    store: Arc<dyn SessionStore>,
    scope: SessionScope,
}

impl ScopedSession {
    pub fn new(store: Arc<dyn SessionStore>, scope: SessionScope) -> Self {
        Self { store, scope }
    }

    pub fn scope(&self) -> &SessionScope {
        &self.scope
    }

    pub async fn get(&self, session_id: &str) -> Result<Option<Value>, SessionError> {
        self.store.get(&self.scope.namespace, session_id).await
    }

    pub async fn set(
        &self,
        session_id: &str,
        value: Value,
        ttl: Duration,
    ) -> Result<(), SessionError> {
        self.store
            .set(&self.scope.namespace, session_id, value, ttl)
            .await
    }

    pub async fn destroy(&self, session_id: &str) -> Result<(), SessionError> {
        self.store.destroy(&self.scope.namespace, session_id).await
    }

    /// Session cookie template bound to this request's tenant domain.
    pub fn session_cookie(&self, session_id: &str) -> Cookie {
        let session_cfg = &config().session;
        Cookie {
            name: session_cfg.cookie_name.clone(),
            value: session_id.to_string(),
            expires: Some(Utc::now() + ChronoDuration::seconds(session_cfg.ttl_secs as i64)),
            path: "/".to_string(),
            domain: Some(self.scope.cookie_domain.clone()),
            secure: session_cfg.cookie_secure,
            http_only: session_cfg.cookie_http_only,
        }
    }
}
