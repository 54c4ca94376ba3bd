// Shared by several test binaries; each uses a different subset.
#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use sqlx::migrate::MigrateError;
use storefront_server::{
    AppState, create_app,
    auth::{JwtBearer, SigningConfigurations, TokenValidationParameters},
    bootstrap::Services,
    db::{self, MigrationError, MigrationReport, SchemaMigrator},
    infra::config::{
        AppEnvironment, AuthConfig, Config, ConfigMetadata, CorsConfig,
        DatabaseConfig, MigrationConfig, ServerConfig, SigningKeySource,
    },
};

pub const ISSUER: &str = "https://auth.storefront.test";
pub const AUDIENCE: &str = "storefront-api";
pub const SECRET: &str = "0123456789abcdef0123456789abcdef-storefront";

/// Nothing listens on port 1, so queries fail fast instead of hanging.
pub const UNREACHABLE_DATABASE_URL: &str =
    "postgres://storefront@127.0.0.1:1/storefront";

pub fn test_config(environment: AppEnvironment) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        environment,
        database: DatabaseConfig {
            primary_url: Some(UNREACHABLE_DATABASE_URL.into()),
            max_connections: 2,
            acquire_timeout: Duration::from_millis(250),
        },
        auth: AuthConfig {
            issuer: ISSUER.into(),
            audience: AUDIENCE.into(),
            signing_key: SigningKeySource::Secret(SECRET.into()),
            token_ttl: Duration::from_secs(900),
            allow_ephemeral_key: false,
        },
        migrations: MigrationConfig {
            apply_on_startup: false,
            directory: PathBuf::from("./migrations"),
        },
        cors: CorsConfig {
            allowed_origins: vec!["http://localhost:3000".into()],
            allowed_methods: vec!["GET".into(), "POST".into()],
            allowed_headers: vec!["Authorization".into()],
            allow_credentials: false,
        },
        metadata: ConfigMetadata::default(),
    }
}

pub fn bearer_for(config: &Config) -> JwtBearer {
    let signing = SigningConfigurations::from_source(&config.auth.signing_key)
        .expect("signing configuration");
    JwtBearer::new(
        Arc::new(signing),
        TokenValidationParameters::from_config(&config.auth),
    )
}

pub fn test_state(config: Config) -> AppState {
    let bearer = bearer_for(&config);
    let pool = db::connect_lazy(
        config.database.primary_url.as_deref().expect("database url"),
        &config.database,
    )
    .expect("lazy pool");
    AppState::new(Arc::new(config), pool, bearer)
}

pub fn test_services(
    config: Config,
    migrator: Arc<dyn SchemaMigrator>,
) -> Services {
    Services {
        state: test_state(config),
        migrator,
    }
}

pub fn test_app(environment: AppEnvironment) -> (Router, AppState) {
    let state = test_state(test_config(environment));
    (create_app(state.clone()), state)
}

pub fn test_server(environment: AppEnvironment) -> (TestServer, AppState) {
    let (router, state) = test_app(environment);
    (TestServer::new(router).unwrap(), state)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Counts calls instead of touching a database.
#[derive(Debug, Default)]
pub struct RecordingMigrator {
    calls: AtomicUsize,
}

impl RecordingMigrator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SchemaMigrator for RecordingMigrator {
    async fn migrate(&self) -> Result<MigrationReport, MigrationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(MigrationReport { available: 1 })
    }
}

/// Always fails, as a broken migration would.
#[derive(Debug, Default)]
pub struct FailingMigrator {
    calls: AtomicUsize,
}

impl FailingMigrator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SchemaMigrator for FailingMigrator {
    async fn migrate(&self) -> Result<MigrationReport, MigrationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(MigrationError::Apply(MigrateError::VersionMissing(1)))
    }
}
