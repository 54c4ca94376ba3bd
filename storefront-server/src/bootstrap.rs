//! One-shot process bootstrap: services, pipeline, migration, listener.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result, anyhow};
use axum::Router;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};

use crate::{
    app::create_app,
    auth::{JwtBearer, SigningConfigurations, TokenValidationParameters},
    db::{self, PostgresMigrator, SchemaMigrator},
    infra::{
        app_state::AppState,
        config::Config,
        startup::{MigrationOutcome, StartupConfig, run_startup_migrations},
    },
};

/// Everything the pipeline and the startup migration need.
pub struct Services {
    pub state: AppState,
    pub migrator: Arc<dyn SchemaMigrator>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// A server whose migrations have run and whose router is assembled, but
/// which is not yet listening.
#[derive(Debug)]
pub struct PreparedServer {
    pub router: Router,
    pub config: Arc<Config>,
    pub migration: MigrationOutcome,
}

/// Build the signing configuration, bearer scheme, pool and migrator.
pub fn register_services(config: Arc<Config>) -> Result<Services> {
    let signing = Arc::new(
        SigningConfigurations::from_source(&config.auth.signing_key)
            .context("failed to prepare token signing keys")?,
    );
    info!(
        key.source = signing.provenance().as_str(),
        key.algorithm = ?signing.algorithm(),
        issuer = %config.auth.issuer,
        audience = %config.auth.audience,
        "bearer authentication configured"
    );
    let bearer = JwtBearer::new(
        signing,
        TokenValidationParameters::from_config(&config.auth),
    );

    let database_url = database_url(&config)?;
    let pool = db::connect_lazy(database_url, &config.database)?;
    let migrator: Arc<dyn SchemaMigrator> = Arc::new(PostgresMigrator::new(
        pool.clone(),
        config.migrations.directory.clone(),
    ));

    Ok(Services {
        state: AppState::new(config, pool, bearer),
        migrator,
    })
}

pub fn database_url(config: &Config) -> Result<&str> {
    let url = config.database.primary_url.as_deref().ok_or_else(|| {
        anyhow!("No PostgreSQL connection configuration found")
    })?;
    db::validate_primary_database_url(url)?;
    Ok(url)
}

/// Assemble the pipeline, then run the startup migration if enabled. A
/// failed migration aborts startup before anything is bound.
pub async fn prepare_server(services: Services) -> Result<PreparedServer> {
    let Services { state, migrator } = services;
    let startup = StartupConfig::from_config(state.config());
    let config = state.config_handle();

    let router = create_app(state);

    let migration = run_startup_migrations(&startup, migrator.as_ref())
        .await
        .context("database migration failed")?;
    if let MigrationOutcome::Applied { available } = migration {
        info!(available, "startup migrations applied");
    }

    Ok(PreparedServer {
        router,
        config,
        migration,
    })
}

impl PreparedServer {
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;

        info!(
            address = %addr,
            environment = %self.config.environment,
            "Storefront API listening"
        );

        axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

        info!("Server shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
