use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub store: StoreConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the hosted backend, e.g. https://xyz.supabase.co
    pub base_url: String,
    /// Project API key sent as the `apikey` header
    pub api_key: String,
    pub request_timeout_secs: u64,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Where the persisted session JSON lives between runs
    pub session_file: PathBuf,
    /// Renew expired sessions with the refresh token instead of forcing re-login
    pub auto_refresh: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Store overrides
        if let Ok(v) = env::var("FOLIO_STORE_URL") {
            self.store.base_url = v;
        }
        if let Ok(v) = env::var("FOLIO_STORE_API_KEY") {
            self.store.api_key = v;
        }
        if let Ok(v) = env::var("FOLIO_STORE_TIMEOUT_SECS") {
            self.store.request_timeout_secs = v.parse().unwrap_or(self.store.request_timeout_secs);
        }
        if let Ok(v) = env::var("FOLIO_STORE_REQUEST_LOGGING") {
            self.store.enable_request_logging = v.parse().unwrap_or(self.store.enable_request_logging);
        }

        // Auth overrides
        if let Ok(v) = env::var("FOLIO_SESSION_FILE") {
            self.auth.session_file = PathBuf::from(v);
        }
        if let Ok(v) = env::var("FOLIO_AUTH_AUTO_REFRESH") {
            self.auth.auto_refresh = v.parse().unwrap_or(self.auth.auto_refresh);
        }

        self
    }

    fn default_session_file() -> PathBuf {
        env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".folio")
            .join("session.json")
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            store: StoreConfig {
                base_url: "http://localhost:54321".to_string(),
                api_key: String::new(),
                request_timeout_secs: 30,
                enable_request_logging: true,
            },
            auth: AuthConfig {
                session_file: Self::default_session_file(),
                auto_refresh: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            store: StoreConfig {
                base_url: String::new(),
                api_key: String::new(),
                request_timeout_secs: 15,
                enable_request_logging: true,
            },
            auth: AuthConfig {
                session_file: Self::default_session_file(),
                auto_refresh: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            store: StoreConfig {
                base_url: String::new(),
                api_key: String::new(),
                request_timeout_secs: 10,
                enable_request_logging: false,
            },
            auth: AuthConfig {
                session_file: Self::default_session_file(),
                auto_refresh: true,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults() {
        let config = AppConfig::development();
        assert!(config.store.enable_request_logging);
        assert_eq!(config.store.request_timeout_secs, 30);
        assert!(config.auth.auto_refresh);
    }

    #[test]
    fn production_defaults() {
        let config = AppConfig::production();
        assert!(!config.store.enable_request_logging);
        assert_eq!(config.store.request_timeout_secs, 10);
    }
}
