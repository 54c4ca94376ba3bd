use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use storefront_server::{
    bootstrap::{prepare_server, register_services},
    db::SchemaMigrator,
    infra::{
        config::{AppEnvironment, ConfigLoader, EnvConfig},
        startup::MigrationOutcome,
    },
};
use tower::ServiceExt;

mod common;
use common::{
    FailingMigrator, RecordingMigrator, SECRET, UNREACHABLE_DATABASE_URL,
    test_config, test_services,
};

fn env_with_trigger(trigger: Option<&str>) -> EnvConfig {
    let mut map: HashMap<String, String> = [
        ("ISSUER", common::ISSUER),
        ("AUDIENCE", common::AUDIENCE),
        ("AUTH_SIGNING_KEY", SECRET),
        ("DATABASE_URL", UNREACHABLE_DATABASE_URL),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    if let Some(value) = trigger {
        map.insert("APPLY_MIGRATIONS".into(), value.into());
    }
    EnvConfig::from_lookup(|key| map.get(key).cloned())
}

async fn migrations_run_for(trigger: Option<&str>) -> Result<usize> {
    let config = ConfigLoader::new()
        .load_with_env(env_with_trigger(trigger))?
        .config;
    let recorder = Arc::new(RecordingMigrator::default());
    let migrator: Arc<dyn SchemaMigrator> = recorder.clone();

    prepare_server(test_services(config, migrator)).await?;
    Ok(recorder.calls())
}

#[tokio::test]
async fn case_insensitive_true_triggers_exactly_one_migration() -> Result<()> {
    for value in ["true", "TRUE", "True", "tRuE"] {
        assert_eq!(migrations_run_for(Some(value)).await?, 1, "{value}");
    }
    Ok(())
}

#[tokio::test]
async fn anything_else_skips_migration() -> Result<()> {
    assert_eq!(migrations_run_for(None).await?, 0, "absent");
    for value in ["false", "1", "yes", "on", "", " true", "true "] {
        assert_eq!(migrations_run_for(Some(value)).await?, 0, "{value:?}");
    }
    Ok(())
}

#[tokio::test]
async fn failed_migration_aborts_startup() {
    let mut config = test_config(AppEnvironment::Production);
    config.migrations.apply_on_startup = true;
    let failing = Arc::new(FailingMigrator::default());

    let err = prepare_server(test_services(config, failing.clone()))
        .await
        .expect_err("startup must fail");

    assert_eq!(failing.calls(), 1, "migration is attempted once, not retried");
    assert!(err.to_string().contains("database migration failed"));
}

#[tokio::test]
async fn broken_migrator_is_never_called_when_disabled() -> Result<()> {
    let config = test_config(AppEnvironment::Production);
    let failing = Arc::new(FailingMigrator::default());

    let prepared = prepare_server(test_services(config, failing.clone())).await?;

    assert_eq!(failing.calls(), 0);
    assert_eq!(prepared.migration, MigrationOutcome::Skipped);
    Ok(())
}

#[tokio::test]
async fn missing_migration_directory_fails_the_real_bootstrap() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(AppEnvironment::Production);
    config.migrations.apply_on_startup = true;
    config.migrations.directory = dir.path().join("missing");

    let services = register_services(Arc::new(config)).unwrap();
    let err = prepare_server(services).await.expect_err("must fail");

    assert!(format!("{err:#}").contains("failed to load migrations"));
}

#[tokio::test]
async fn prepared_router_serves_requests() -> Result<()> {
    let recorder = Arc::new(RecordingMigrator::default());
    let mut config = test_config(AppEnvironment::Production);
    config.migrations.apply_on_startup = true;

    let prepared = prepare_server(test_services(config, recorder.clone())).await?;
    assert_eq!(
        prepared.migration,
        MigrationOutcome::Applied { available: 1 }
    );

    let response = prepared
        .router
        .oneshot(Request::builder().uri("/ping").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn register_services_requires_a_database_url() {
    let mut config = test_config(AppEnvironment::Production);
    config.database.primary_url = None;

    let err = register_services(Arc::new(config)).unwrap_err();
    assert!(err.to_string().contains("PostgreSQL"));
}
