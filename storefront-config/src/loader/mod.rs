pub mod db_url;
pub mod error;

use std::{fs, path::PathBuf, time::Duration};

use self::{
    db_url::{read_secret_file, resolve_database_url},
    error::ConfigLoadError,
};
use crate::{
    constants::{
        DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_CONFIG_FILE_NAMES,
        DEFAULT_MAX_CONNECTIONS, DEFAULT_MIGRATIONS_DIR, DEFAULT_SERVER_HOST,
        DEFAULT_SERVER_PORT, DEFAULT_TOKEN_TTL, MIN_SIGNING_SECRET_LENGTH,
    },
    models::{
        AppEnvironment, AuthConfig, Config, ConfigMetadata, CorsConfig,
        DatabaseConfig, MigrationConfig, ServerConfig, SigningKeySource,
        sources::{EnvConfig, FileAuthConfig, FileConfig},
    },
    validation::{self, ConfigWarnings},
};

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Load `.env`, snapshot the process environment, then compose.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        let mut load = self.load_with_env(EnvConfig::gather())?;
        load.config.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Compose from an already gathered environment. No `.env` handling.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let mut warnings = ConfigWarnings::default();

        if config_path.is_none() {
            warnings.push_with_hint(
                "No storefront.toml detected; using environment variables only",
                "Set STOREFRONT_CONFIG_PATH or pass --config to load a file",
            );
        }

        let config =
            compose_config(file_config.unwrap_or_default(), env, config_path)?;

        let guard_warnings = validation::apply_guard_rails(&config)?;
        warnings.extend(guard_warnings);

        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        // Explicit and env-provided paths must exist; defaults are optional.
        let required = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match required {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_FILE_NAMES
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists())
            {
                Some(path) => path,
                None => return Ok((None, None)),
            },
        };

        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;

        Ok((Some(file_config), Some(path)))
    }
}

fn compose_config(
    file: FileConfig,
    env: EnvConfig,
    config_path: Option<PathBuf>,
) -> Result<Config, ConfigLoadError> {
    let FileConfig {
        environment: file_environment,
        server: file_server,
        database: file_database,
        auth: file_auth,
        migrations: file_migrations,
        cors: file_cors,
    } = file;

    let environment = env
        .environment
        .clone()
        .or(file_environment)
        .map(|raw| raw.parse::<AppEnvironment>().unwrap_or_default())
        .unwrap_or_default();

    let server = ServerConfig {
        host: env
            .server_host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
        port: env
            .server_port
            .or(file_server.port)
            .unwrap_or(DEFAULT_SERVER_PORT),
    };

    let database = DatabaseConfig {
        primary_url: resolve_database_url(&env, &file_database)?,
        max_connections: env
            .database_max_connections
            .or(file_database.max_connections)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS),
        acquire_timeout: parse_duration_setting(
            "DATABASE_ACQUIRE_TIMEOUT",
            env.database_acquire_timeout
                .as_deref()
                .or(file_database.acquire_timeout.as_deref()),
        )?
        .unwrap_or(DEFAULT_ACQUIRE_TIMEOUT),
    };

    let auth = compose_auth(&env, file_auth)?;

    let migrations = MigrationConfig {
        // Only APPLY_MIGRATIONS in the environment can turn this on.
        apply_on_startup: env.apply_migrations.unwrap_or(false),
        directory: env
            .migrations_dir
            .clone()
            .or(file_migrations.directory)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MIGRATIONS_DIR)),
    };

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .clone()
            .or(file_cors.allowed_origins)
            .unwrap_or_else(default_cors_origins),
        allowed_methods: env
            .cors_allowed_methods
            .clone()
            .or(file_cors.allowed_methods)
            .unwrap_or_else(default_cors_methods),
        allowed_headers: env
            .cors_allowed_headers
            .clone()
            .or(file_cors.allowed_headers)
            .unwrap_or_else(default_cors_headers),
        allow_credentials: env
            .cors_allow_credentials
            .or(file_cors.allow_credentials)
            .unwrap_or(false),
    };

    Ok(Config {
        server,
        environment,
        database,
        auth,
        migrations,
        cors,
        metadata: ConfigMetadata {
            config_path,
            env_file_loaded: false,
        },
    })
}

fn compose_auth(
    env: &EnvConfig,
    file_auth: FileAuthConfig,
) -> Result<AuthConfig, ConfigLoadError> {
    let issuer = required(env.issuer.clone().or(file_auth.issuer), "ISSUER")?;
    let audience =
        required(env.audience.clone().or(file_auth.audience), "AUDIENCE")?;

    let private_key = env
        .signing_private_key_file
        .clone()
        .or(file_auth.private_key_file);
    let public_key = env
        .signing_public_key_file
        .clone()
        .or(file_auth.public_key_file);

    let signing_key = match (private_key, public_key) {
        (Some(private_key), Some(public_key)) => SigningKeySource::RsaPem {
            private_key,
            public_key,
        },
        (Some(_), None) | (None, Some(_)) => {
            return Err(ConfigLoadError::IncompleteKeyPair);
        }
        (None, None) => {
            let secret = match env
                .signing_key
                .clone()
                .filter(|value| !value.trim().is_empty())
            {
                Some(secret) => Some(secret),
                None => match env
                    .signing_key_file
                    .as_ref()
                    .or(file_auth.signing_key_file.as_ref())
                {
                    Some(path) => read_secret_file(path)?,
                    None => None,
                },
            };

            match secret {
                Some(secret) if secret.len() < MIN_SIGNING_SECRET_LENGTH => {
                    return Err(ConfigLoadError::WeakSigningSecret {
                        length: secret.len(),
                        minimum: MIN_SIGNING_SECRET_LENGTH,
                    });
                }
                Some(secret) => SigningKeySource::Secret(secret),
                None => SigningKeySource::Ephemeral,
            }
        }
    };

    let token_ttl = parse_duration_setting(
        "AUTH_TOKEN_TTL",
        env.token_ttl.as_deref().or(file_auth.token_ttl.as_deref()),
    )?
    .unwrap_or(DEFAULT_TOKEN_TTL);

    Ok(AuthConfig {
        issuer,
        audience,
        signing_key,
        token_ttl,
        allow_ephemeral_key: env
            .allow_ephemeral_key
            .or(file_auth.allow_ephemeral_key)
            .unwrap_or(false),
    })
}

fn required(
    value: Option<String>,
    key: &'static str,
) -> Result<String, ConfigLoadError> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigLoadError::MissingRequired { key })
}

fn parse_duration_setting(
    key: &'static str,
    raw: Option<&str>,
) -> Result<Option<Duration>, ConfigLoadError> {
    raw.map(|value| {
        humantime::parse_duration(value.trim()).map_err(|source| {
            ConfigLoadError::InvalidDuration {
                key,
                value: value.to_string(),
                source,
            }
        })
    })
    .transpose()
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

fn default_cors_methods() -> Vec<String> {
    vec![
        "GET".to_string(),
        "POST".to_string(),
        "PUT".to_string(),
        "PATCH".to_string(),
        "DELETE".to_string(),
        "OPTIONS".to_string(),
    ]
}

fn default_cors_headers() -> Vec<String> {
    vec!["Authorization".to_string(), "Content-Type".to_string()]
}
