use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Ten years
const MAX_SESSION_TTL_HOURS: u64 = 24 * 365 * 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub cache: CacheConfig,
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Where layout data and sessions live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackend {
    Postgres,
    /// Process-local tables; nothing survives a restart.
    Memory,
}

impl StorageBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Some(StorageBackend::Postgres),
            "memory" | "mem" | "in-memory" => Some(StorageBackend::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub backend: StorageBackend,
    pub seed_demo_data: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub request_timeout_secs: u64,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    pub session_ttl_hours: u64,
    pub min_password_length: usize,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Admin account created at startup when no user with that name exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(skip_serializing)]
    pub redis_url: Option<String>,
    pub queue_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub max_tree_depth: usize,
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

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.security.session_ttl_hours as i64)
    }

    pub fn queue_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.queue_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("STORE_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("STORAGE_BACKEND") {
            self.server.backend = StorageBackend::parse(&v).unwrap_or(self.server.backend);
        }
        if let Ok(v) = env::var("SEED_DEMO_DATA") {
            self.server.seed_demo_data = v.parse().unwrap_or(self.server.seed_demo_data);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // API overrides
        if let Ok(v) = env::var("API_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().unwrap_or(self.api.request_timeout_secs);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("SECURITY_SESSION_TTL_HOURS") {
            self.security.session_ttl_hours = v.parse().unwrap_or(self.security.session_ttl_hours);
        }
        if let Ok(v) = env::var("SECURITY_MIN_PASSWORD_LENGTH") {
            self.security.min_password_length = v.parse().unwrap_or(self.security.min_password_length);
        }
        if let (Ok(username), Ok(password)) = (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
            if !username.is_empty() && !password.is_empty() {
                self.security.bootstrap_admin = Some(BootstrapAdmin { username, password });
            }
        }

        // Cache overrides
        if let Ok(v) = env::var("REDIS_URL") {
            if !v.trim().is_empty() {
                self.cache.redis_url = Some(v);
            }
        }
        if let Ok(v) = env::var("CACHE_QUEUE_TTL_SECS") {
            self.cache.queue_ttl_secs = v.parse().unwrap_or(self.cache.queue_ttl_secs);
        }

        // Layout overrides
        if let Ok(v) = env::var("LAYOUT_MAX_TREE_DEPTH") {
            self.layout.max_tree_depth = v.parse().unwrap_or(self.layout.max_tree_depth);
        }

        self.clamped()
    }

    /// Pull overridden values back into the range the services can use
    fn clamped(mut self) -> Self {
        self.security.session_ttl_hours = self.security.session_ttl_hours.min(MAX_SESSION_TTL_HOURS);
        self.layout.max_tree_depth = self.layout.max_tree_depth.max(1);
        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                backend: StorageBackend::Postgres,
                seed_demo_data: true,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                request_timeout_secs: 10,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                cors_origins: vec!["http://localhost:3000".to_string()],
                session_ttl_hours: 24,
                min_password_length: 6,
                bootstrap_admin: Some(BootstrapAdmin {
                    username: "admin".to_string(),
                    password: "admin123".to_string(),
                }),
            },
            cache: CacheConfig {
                redis_url: None,
                queue_ttl_secs: 600,
            },
            layout: LayoutConfig { max_tree_depth: 64 },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                backend: StorageBackend::Postgres,
                seed_demo_data: true,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            api: ApiConfig {
                request_timeout_secs: 10,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                cors_origins: vec!["https://staging.example.com".to_string()],
                session_ttl_hours: 24,
                min_password_length: 10,
                bootstrap_admin: None,
            },
            cache: CacheConfig {
                redis_url: None,
                queue_ttl_secs: 600,
            },
            layout: LayoutConfig { max_tree_depth: 64 },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                backend: StorageBackend::Postgres,
                seed_demo_data: false,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            api: ApiConfig {
                request_timeout_secs: 10,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                cors_origins: vec!["https://app.example.com".to_string()],
                session_ttl_hours: 12,
                min_password_length: 12,
                bootstrap_admin: None,
            },
            cache: CacheConfig {
                redis_url: None,
                queue_ttl_secs: 600,
            },
            layout: LayoutConfig { max_tree_depth: 32 },
        }
    }

    /// In-memory configuration used by tests; never reads the environment.
    pub fn for_tests() -> Self {
        let mut config = Self::development();
        config.server.backend = StorageBackend::Memory;
        config.server.seed_demo_data = false;
        config.database.run_migrations = false;
        config.security.bootstrap_admin = None;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 8080);
        assert!(config.server.seed_demo_data);
        assert_eq!(config.security.session_ttl_hours, 24);
        assert_eq!(config.cache.queue_ttl_secs, 600);
        assert_eq!(config.security.cors_origins, vec!["http://localhost:3000".to_string()]);
        let admin = config.security.bootstrap_admin.expect("dev ships a bootstrap admin");
        assert_eq!(admin.username, "admin");
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.server.seed_demo_data);
        assert!(!config.database.run_migrations);
        assert!(config.security.bootstrap_admin.is_none());
        assert!(config.layout.max_tree_depth < AppConfig::development().layout.max_tree_depth);
    }

    #[test]
    fn parses_storage_backend_names() {
        assert_eq!(StorageBackend::parse("memory"), Some(StorageBackend::Memory));
        assert_eq!(StorageBackend::parse(" Postgres "), Some(StorageBackend::Postgres));
        assert_eq!(StorageBackend::parse("sqlite"), None);
    }

    #[test]
    fn test_out_of_range_overrides_are_clamped() {
        let mut config = AppConfig::development();
        config.security.session_ttl_hours = u64::MAX;
        config.layout.max_tree_depth = 0;
        let config = config.clamped();
        assert_eq!(config.security.session_ttl_hours, MAX_SESSION_TTL_HOURS);
        assert_eq!(config.layout.max_tree_depth, 1);
        assert_eq!(config.session_ttl(), chrono::Duration::hours(MAX_SESSION_TTL_HOURS as i64));
    }

    #[test]
    fn test_config_is_memory_backed() {
        let config = AppConfig::for_tests();
        assert_eq!(config.server.backend, StorageBackend::Memory);
        assert!(config.security.bootstrap_admin.is_none());
        assert_eq!(config.session_ttl(), chrono::Duration::hours(24));
    }
}
