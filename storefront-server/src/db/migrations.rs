use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlx::{
    PgPool,
    migrate::{MigrateError, Migrator},
};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to load migrations from {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: MigrateError,
    },
    #[error("failed to acquire a database connection for migration: {0}")]
    Connection(#[source] sqlx::Error),
    #[error("failed to apply migrations: {0}")]
    Apply(#[source] MigrateError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MigrationReport {
    /// Migrations known to the migrator; already-applied ones are skipped.
    pub available: usize,
}

/// Brings the schema up to the latest known version.
#[async_trait]
pub trait SchemaMigrator: Send + Sync {
    async fn migrate(&self) -> Result<MigrationReport, MigrationError>;
}

/// Applies the SQL migrations in a directory using one scoped connection.
#[derive(Debug, Clone)]
pub struct PostgresMigrator {
    pool: PgPool,
    directory: PathBuf,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool, directory: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[async_trait]
impl SchemaMigrator for PostgresMigrator {
    async fn migrate(&self) -> Result<MigrationReport, MigrationError> {
        let migrator =
            Migrator::new(self.directory.as_path()).await.map_err(|source| {
                MigrationError::Load {
                    path: self.directory.clone(),
                    source,
                }
            })?;
        let available = migrator.iter().count();

        // The connection goes back to the pool when it drops, on both paths.
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(MigrationError::Connection)?;
        migrator
            .run_direct(&mut *conn)
            .await
            .map_err(MigrationError::Apply)?;

        info!(
            directory = %self.directory.display(),
            available,
            "database schema is up to date"
        );
        Ok(MigrationReport { available })
    }
}
