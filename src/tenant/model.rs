use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use url::Url;

/// One isolated site sharing the runtime with every other site.
///
/// `admin_entry_token` is a capability: the secret path segment that unlocks
/// the tenant's administrative routes. Rotating it invalidates every
/// previously known admin URL for the tenant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub id: i64,
    pub name: String,
    pub hosts: Vec<String>,
    pub admin_entry_token: String,
    pub config: Value,
    pub resource_cdn: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Dotted-path lookup into the tenant's config document.
    ///
    /// Returns `default` when any segment is missing or a non-object value is
    /// traversed mid-path. Never panics on malformed documents.
    pub fn config_get(&self, path: &str, default: Value) -> Value {
        let mut current = &self.config;
        for segment in path.split('.') {
            match current {
                Value::Object(map) => match map.get(segment) {
                    Some(next) => current = next,
                    None => return default,
                },
                _ => return default,
            }
        }
        current.clone()
    }

    /// Canonical admin URL for a sub-path under this tenant's entry token.
    ///
    /// Slash placement is normalized: `admin_path("")`, `admin_path("/x")`
    /// and `admin_path("x/")` all produce a single well-formed path.
    pub fn admin_path(&self, sub: &str) -> String {
        let trimmed = sub.trim_matches('/');
        if trimmed.is_empty() {
            format!("/admin/{}", self.admin_entry_token)
        } else {
            format!("/admin/{}/{}", self.admin_entry_token, trimmed)
        }
    }

    /// Absolute URL for a static asset served from the tenant's CDN base,
    /// or None when the tenant has no CDN configured or the base is invalid.
    pub fn asset_url(&self, path: &str) -> Option<String> {
        let base = self.resource_cdn.as_deref()?;
        Url::parse(base).ok()?;
        Some(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }

    /// Case-insensitive host match, ignoring any `:port` suffix.
    pub fn matches_host(&self, host: &str) -> bool {
        let wanted = host
            .split(':')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        self.hosts.iter().any(|h| h.eq_ignore_ascii_case(&wanted))
    }
}
