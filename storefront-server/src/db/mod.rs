pub mod migrations;

use anyhow::{Context, Result, anyhow};
use sqlx::{PgPool, postgres::PgPoolOptions};
use storefront_config::DatabaseConfig;
use url::Url;

pub use migrations::{
    MigrationError, MigrationReport, PostgresMigrator, SchemaMigrator,
};

/// Reject anything that is not a PostgreSQL URL naming a database.
pub fn validate_primary_database_url(raw: &str) -> Result<()> {
    let url = Url::parse(raw).context("invalid PostgreSQL URL")?;
    if !matches!(url.scheme(), "postgres" | "postgresql") {
        return Err(anyhow!(
            "Invalid database URL: must start with postgres:// or postgresql://"
        ));
    }
    if url.path().trim_start_matches('/').is_empty() {
        return Err(anyhow!("database URL must include database name"));
    }
    Ok(())
}

/// Build the pool without opening a connection; the first query (or the
/// startup migration) dials the server.
pub fn connect_lazy(url: &str, config: &DatabaseConfig) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_lazy(url)
        .context("failed to configure PostgreSQL pool")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_both_postgres_schemes() {
        assert!(validate_primary_database_url("postgres://u@localhost/shop").is_ok());
        assert!(
            validate_primary_database_url("postgresql://u:p@db:5432/shop").is_ok()
        );
    }

    #[test]
    fn rejects_other_databases_and_missing_names() {
        assert!(validate_primary_database_url("mysql://u@localhost/shop").is_err());
        assert!(validate_primary_database_url("postgres://u@localhost/").is_err());
        assert!(validate_primary_database_url("not a url").is_err());
    }
}
