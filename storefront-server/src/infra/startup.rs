use tracing::info;

use crate::{
    db::{MigrationError, SchemaMigrator},
    infra::config::{AppEnvironment, Config},
};

/// Startup decisions derived once from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    pub environment: AppEnvironment,
    pub apply_migrations: bool,
}

impl StartupConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            environment: config.environment.clone(),
            apply_migrations: config.migrations.apply_on_startup,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    Skipped,
    Applied { available: usize },
}

/// Run the schema migrator at most once, and only when enabled.
pub async fn run_startup_migrations(
    startup: &StartupConfig,
    migrator: &dyn SchemaMigrator,
) -> Result<MigrationOutcome, MigrationError> {
    if !startup.apply_migrations {
        info!("APPLY_MIGRATIONS not set to true; skipping startup migrations");
        return Ok(MigrationOutcome::Skipped);
    }

    info!(
        environment = %startup.environment,
        "applying database migrations before serving"
    );
    let report = migrator.migrate().await?;
    Ok(MigrationOutcome::Applied {
        available: report.available,
    })
}
