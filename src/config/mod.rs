use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub directory: DirectoryConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// TTL for cached host -> tenant lookups. Bounds how long a rotated
    /// admin entry token can keep working when nobody calls invalidate.
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub ttl_secs: u64,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub cookie_http_only: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Environment defaults first, then specific env var overrides
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("DIRECTORY_CACHE_TTL_SECS") {
            self.directory.cache_ttl_secs = v.parse().unwrap_or(self.directory.cache_ttl_secs);
        }
        if let Ok(v) = env::var("SESSION_TTL_SECS") {
            self.session.ttl_secs = v.parse().unwrap_or(self.session.ttl_secs);
        }
        if let Ok(v) = env::var("SESSION_COOKIE_NAME") {
            self.session.cookie_name = v;
        }
        if let Ok(v) = env::var("SESSION_COOKIE_SECURE") {
            self.session.cookie_secure = v.parse().unwrap_or(self.session.cookie_secure);
        }
        if let Ok(v) = env::var("SESSION_COOKIE_HTTP_ONLY") {
            self.session.cookie_http_only = v.parse().unwrap_or(self.session.cookie_http_only);
        }
        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            directory: DirectoryConfig { cache_ttl_secs: 5 },
            session: SessionConfig {
                ttl_secs: 60 * 60,
                cookie_name: "hive_session".to_string(),
                cookie_secure: false,
                cookie_http_only: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            directory: DirectoryConfig { cache_ttl_secs: 30 },
            session: SessionConfig {
                ttl_secs: 60 * 60,
                cookie_name: "hive_session".to_string(),
                cookie_secure: true,
                cookie_http_only: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            directory: DirectoryConfig { cache_ttl_secs: 30 },
            session: SessionConfig {
                ttl_secs: 60 * 60 * 8,
                cookie_name: "hive_session".to_string(),
                cookie_secure: true,
                cookie_http_only: true,
            },
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

/// Process-wide configuration singleton, loaded once from the environment.
pub fn config() -> &'static AppConfig {
    &CONFIG
}
