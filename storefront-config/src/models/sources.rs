use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::util::{parse_bool, parse_csv, parse_migration_trigger};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
    #[serde(default)]
    pub migrations: FileMigrationConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
    /// Humantime duration, e.g. `"5s"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquire_timeout: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileAuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_key_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_ephemeral_key: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileMigrationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_methods: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_headers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_credentials: Option<bool>,
}

/// Environment-derived configuration values.
///
/// Secrets are deliberately not readable from the TOML file; they arrive via
/// the environment or a `*_FILE` path only.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub environment: Option<String>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub database_url: Option<String>,
    pub database_url_file: Option<PathBuf>,
    pub database_host: Option<String>,
    pub database_port: Option<u16>,
    pub database_user: Option<String>,
    pub database_name: Option<String>,
    pub database_password: Option<String>,
    pub database_password_file: Option<PathBuf>,
    pub database_max_connections: Option<u32>,
    pub database_acquire_timeout: Option<String>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub signing_key: Option<String>,
    pub signing_key_file: Option<PathBuf>,
    pub signing_private_key_file: Option<PathBuf>,
    pub signing_public_key_file: Option<PathBuf>,
    pub token_ttl: Option<String>,
    pub allow_ephemeral_key: Option<bool>,
    /// `Some(true)` only for a case-insensitive `"true"`; `Some(false)` for
    /// any other value that was present.
    pub apply_migrations: Option<bool>,
    pub migrations_dir: Option<PathBuf>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub cors_allowed_methods: Option<Vec<String>>,
    pub cors_allowed_headers: Option<Vec<String>>,
    pub cors_allow_credentials: Option<bool>,
}

impl EnvConfig {
    /// Snapshot the process environment.
    pub fn gather() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = |key: &str| lookup(key).map(PathBuf::from);
        let csv = |key: &str| lookup(key).map(|raw| parse_csv(&raw));
        let flag = |key: &str| lookup(key).and_then(|raw| parse_bool(&raw));

        Self {
            config_path: path("STOREFRONT_CONFIG_PATH"),
            environment: lookup("APP_ENVIRONMENT"),
            server_host: lookup("SERVER_HOST"),
            server_port: lookup("SERVER_PORT").and_then(|s| s.parse().ok()),
            database_url: lookup("DATABASE_URL"),
            database_url_file: path("DATABASE_URL_FILE"),
            database_host: lookup("DATABASE_HOST"),
            database_port: lookup("DATABASE_PORT")
                .and_then(|s| s.parse().ok()),
            database_user: lookup("DATABASE_USER"),
            database_name: lookup("DATABASE_NAME"),
            database_password: lookup("DATABASE_PASSWORD"),
            database_password_file: path("DATABASE_PASSWORD_FILE"),
            database_max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok()),
            database_acquire_timeout: lookup("DATABASE_ACQUIRE_TIMEOUT"),
            issuer: lookup("ISSUER"),
            audience: lookup("AUDIENCE"),
            signing_key: lookup("AUTH_SIGNING_KEY"),
            signing_key_file: path("AUTH_SIGNING_KEY_FILE"),
            signing_private_key_file: path("AUTH_SIGNING_PRIVATE_KEY_FILE"),
            signing_public_key_file: path("AUTH_SIGNING_PUBLIC_KEY_FILE"),
            token_ttl: lookup("AUTH_TOKEN_TTL"),
            allow_ephemeral_key: flag("AUTH_ALLOW_EPHEMERAL_KEY"),
            apply_migrations: lookup("APPLY_MIGRATIONS")
                .map(|raw| parse_migration_trigger(Some(&raw))),
            migrations_dir: path("MIGRATIONS_DIR"),
            cors_allowed_origins: csv("CORS_ALLOWED_ORIGINS"),
            cors_allowed_methods: csv("CORS_ALLOWED_METHODS"),
            cors_allowed_headers: csv("CORS_ALLOWED_HEADERS"),
            cors_allow_credentials: flag("CORS_ALLOW_CREDENTIALS"),
        }
    }
}
