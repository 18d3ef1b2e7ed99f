// Per-request tenant context
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

use crate::tenant::Tenant;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("request context already bound to tenant {bound}, refusing rebind to {attempted}")]
    AlreadyBound { bound: i64, attempted: i64 },
}

/// Write-once carrier for the resolved tenant, created at pipeline entry and
/// dropped at response finalization.
///
/// Cloning shares the same underlying slot, so the copy handed to request
/// extensions and the one held by middleware observe the same binding. A
/// request must never be re-pointed at a different tenant mid-flight;
/// rebinding the same tenant is a no-op so nested resolvers stay idempotent.
#[derive(Clone, Default)]
pub struct RequestContext {
    slot: Arc<OnceLock<Tenant>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the resolved tenant. At most one tenant per request.
    pub fn bind(&self, tenant: Tenant) -> Result<(), ContextError> {
        let attempted = tenant.id;
        if let Err(rejected) = self.slot.set(tenant) {
            let bound = self
                .slot
                .get()
                .map(|t| t.id)
                .unwrap_or(rejected.id);
            if bound != attempted {
                return Err(ContextError::AlreadyBound { bound, attempted });
            }
        }
        Ok(())
    }

    pub fn tenant(&self) -> Option<&Tenant> {
        self.slot.get()
    }

    pub fn tenant_id(&self) -> Option<i64> {
        self.slot.get().map(|t| t.id)
    }

    pub fn is_resolved(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Dotted-path read into the bound tenant's config document; `default`
    /// when no tenant is bound or the path does not exist.
    pub fn config(&self, path: &str, default: Value) -> Value {
        match self.slot.get() {
            Some(tenant) => tenant.config_get(path, default),
            None => default,
        }
    }
}
