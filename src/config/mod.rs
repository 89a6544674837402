use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use thiserror::Error;

/// Secret used when running in development without `JWT_SECRET`.
pub const DEVELOPMENT_JWT_SECRET: &str = "ags-development-secret-do-not-use-in-production";

/// Minimum secret length accepted outside development.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set in {0:?} mode")]
    MissingSecret(Environment),

    #[error("JWT_SECRET must be at least 32 bytes in {0:?} mode")]
    WeakSecret(Environment),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string; the in-memory store is used when absent.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub default_list_limit: i64,
    pub max_list_limit: i64,
    pub max_request_size_bytes: usize,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    pub jwt_expiry_hours: u64,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("cors_origins", &self.cors_origins)
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("jwt_secret", &"<redacted>")
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup so tests need not touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        Self::for_environment(environment).with_overrides(lookup)
    }

    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(v) = lookup("AGS_API_PORT").or_else(|| lookup("PORT")) {
            self.server.port = parse("PORT", v)?;
        }

        // Database
        if let Some(v) = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            self.database.url = Some(v);
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse("DATABASE_MAX_CONNECTIONS", v)?;
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse("DATABASE_CONNECTION_TIMEOUT", v)?;
        }

        // API
        if let Some(v) = lookup("API_DEFAULT_LIST_LIMIT") {
            self.api.default_list_limit = parse("API_DEFAULT_LIST_LIMIT", v)?;
        }
        if let Some(v) = lookup("API_MAX_LIST_LIMIT") {
            self.api.max_list_limit = parse("API_MAX_LIST_LIMIT", v)?;
        }
        if let Some(v) = lookup("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = parse("API_MAX_REQUEST_SIZE_BYTES", v)?;
        }

        // Security
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = lookup("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = parse("SECURITY_JWT_EXPIRY_HOURS", v)?;
        }

        match lookup("JWT_SECRET").filter(|v| !v.is_empty()) {
            Some(secret) => {
                if self.environment != Environment::Development && secret.len() < MIN_SECRET_LEN {
                    return Err(ConfigError::WeakSecret(self.environment));
                }
                self.security.jwt_secret = secret;
            }
            None if self.environment == Environment::Development => {
                tracing::warn!("JWT_SECRET not set; using the built-in development secret");
            }
            None => return Err(ConfigError::MissingSecret(self.environment)),
        }

        Ok(self)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 5555 },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                default_list_limit: 5,
                max_list_limit: 1000,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                cors_origins: vec!["*".to_string()],
                jwt_expiry_hours: 24,
                jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 5555 },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                default_list_limit: 5,
                max_list_limit: 500,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_expiry_hours: 24,
                jwt_secret: String::new(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 5555 },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                default_list_limit: 5,
                max_list_limit: 100,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_expiry_hours: 4,
                jwt_secret: String::new(),
            },
        }
    }

    /// Clamp a client-supplied `limit` query parameter.
    pub fn list_limit(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.api.default_list_limit)
            .clamp(1, self.api.max_list_limit)
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}
