//! # Storefront Server
//!
//! Boots the Storefront REST API:
//!
//! - **Configuration**: `.env`, optional `storefront.toml`, process environment
//! - **Authentication**: JWT bearer tokens checked against a configured issuer
//!   and audience with zero clock skew, and a `Bearer` authorization policy
//! - **Persistence**: PostgreSQL through a lazily connecting `sqlx` pool
//! - **Migrations**: applied before serving when `APPLY_MIGRATIONS=true`
//! - **Docs**: Swagger UI in the `Development` environment only

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, bail};
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde_json::json;
use tracing::info;

use storefront_server::{
    auth::{JwtBearer, SigningConfigurations, TokenValidationParameters},
    bootstrap::{self, prepare_server, register_services},
    db::{self, PostgresMigrator, SchemaMigrator},
    infra::{
        config::{Config, ConfigLoad, ConfigLoader},
        telemetry,
    },
};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "storefront-server")]
#[command(about = "Storefront e-commerce REST API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Path to a storefront.toml configuration file
    #[arg(long, env = "STOREFRONT_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Path to a .env file (defaults to ./.env when present)
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
    #[command(subcommand)]
    Token(TokenCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit, regardless of APPLY_MIGRATIONS
    Migrate,
}

#[derive(Debug, Subcommand)]
enum TokenCommand {
    /// Mint a bearer token signed with the configured key
    Mint(MintArgs),
}

#[derive(ClapArgs, Debug)]
struct MintArgs {
    /// Value of the `sub` claim
    #[arg(long)]
    subject: String,

    /// Optional display name carried in the `name` claim
    #[arg(long)]
    name: Option<String>,

    /// Token lifetime, e.g. `15m` or `2h` (defaults to AUTH_TOKEN_TTL)
    #[arg(long, value_parser = humantime::parse_duration)]
    ttl: Option<Duration>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(command) = cli.command {
        return match command {
            Command::Db(DbCommand::Migrate) => run_db_migrate(&cli.serve).await,
            Command::Token(TokenCommand::Mint(args)) => {
                run_token_mint(&cli.serve, args)
            }
        };
    }

    run_server(&cli.serve).await
}

async fn run_server(args: &ServeArgs) -> anyhow::Result<()> {
    let config = load_runtime_config(args)?;
    let services = register_services(config)?;
    let server = prepare_server(services).await?;
    server.serve().await
}

async fn run_db_migrate(args: &ServeArgs) -> anyhow::Result<()> {
    let config = load_runtime_config(args)?;
    let pool = db::connect_lazy(
        bootstrap::database_url(&config)?,
        &config.database,
    )?;
    let report =
        PostgresMigrator::new(pool, config.migrations.directory.clone())
            .migrate()
            .await
            .context("database migration failed")?;
    info!(
        available = report.available,
        "Database migrations applied successfully"
    );
    Ok(())
}

fn run_token_mint(args: &ServeArgs, mint: MintArgs) -> anyhow::Result<()> {
    let config = load_runtime_config(args)?;
    if config.auth.signing_key.is_ephemeral() {
        bail!(
            "no signing key configured; set AUTH_SIGNING_KEY or the AUTH_SIGNING_*_KEY_FILE pair before minting tokens"
        );
    }

    let signing = SigningConfigurations::from_source(&config.auth.signing_key)
        .context("failed to prepare token signing keys")?;
    let bearer = JwtBearer::new(
        Arc::new(signing),
        TokenValidationParameters::from_config(&config.auth),
    );
    let issued = bearer
        .issue(
            &mint.subject,
            mint.name.as_deref(),
            mint.ttl.unwrap_or(config.auth.token_ttl),
        )
        .context("failed to mint token")?;

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "accessToken": issued.access_token,
            "tokenType": issued.token_type,
            "expiresAt": issued.expires_at.to_rfc3339(),
        }))?
    );
    Ok(())
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Arc<Config>> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = args.config.clone() {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = args.env_file.clone() {
        loader = loader.with_env_file(path);
    }

    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }

    telemetry::init_tracing();
    telemetry::log_config_warnings(&warnings, config.metadata.env_file_loaded);

    if let Some(path) = config.metadata.config_path.as_ref() {
        info!(path = %path.display(), "configuration file loaded");
    }
    info!(
        environment = %config.environment,
        apply_migrations = config.migrations.apply_on_startup,
        "configuration loaded"
    );

    Ok(Arc::new(config))
}
