pub mod sources;

use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub environment: AppEnvironment,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub migrations: MigrationConfig,
    pub cors: CorsConfig,
    pub metadata: ConfigMetadata,
}

impl Config {
    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Deployment classification. Only `Development` exposes the API docs.
///
/// Unknown names are kept verbatim so operators can run bespoke stages
/// (`qa`, `perf`) without the server refusing to boot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppEnvironment {
    Development,
    Staging,
    #[default]
    Production,
    Custom(String),
}

impl AppEnvironment {
    pub fn is_development(&self) -> bool {
        matches!(self, AppEnvironment::Development)
    }

    pub fn is_production(&self) -> bool {
        matches!(self, AppEnvironment::Production)
    }
}

impl FromStr for AppEnvironment {
    type Err = std::convert::Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Ok(match trimmed.to_ascii_lowercase().as_str() {
            "development" => AppEnvironment::Development,
            "staging" => AppEnvironment::Staging,
            "production" => AppEnvironment::Production,
            _ => AppEnvironment::Custom(trimmed.to_string()),
        })
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppEnvironment::Development => f.write_str("Development"),
            AppEnvironment::Staging => f.write_str("Staging"),
            AppEnvironment::Production => f.write_str("Production"),
            AppEnvironment::Custom(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub primary_url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Expected `iss` claim of every bearer token.
    pub issuer: String,
    /// Expected `aud` claim of every bearer token.
    pub audience: String,
    pub signing_key: SigningKeySource,
    /// Lifetime of tokens minted with `token mint`.
    pub token_ttl: Duration,
    pub allow_ephemeral_key: bool,
}

/// Where the bearer signing key comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum SigningKeySource {
    /// RS256 with a PEM encoded key pair on disk.
    RsaPem {
        private_key: PathBuf,
        public_key: PathBuf,
    },
    /// HS256 with a shared secret.
    Secret(String),
    /// HS256 with a random secret generated at every boot.
    Ephemeral,
}

impl SigningKeySource {
    pub fn is_ephemeral(&self) -> bool {
        matches!(self, SigningKeySource::Ephemeral)
    }

    pub fn describe(&self) -> &'static str {
        match self {
            SigningKeySource::RsaPem { .. } => "rsa-pem",
            SigningKeySource::Secret(_) => "shared-secret",
            SigningKeySource::Ephemeral => "ephemeral",
        }
    }
}

impl fmt::Debug for SigningKeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningKeySource::RsaPem {
                private_key,
                public_key,
            } => f
                .debug_struct("RsaPem")
                .field("private_key", private_key)
                .field("public_key", public_key)
                .finish(),
            SigningKeySource::Secret(_) => {
                f.debug_tuple("Secret").field(&"<redacted>").finish()
            }
            SigningKeySource::Ephemeral => f.write_str("Ephemeral"),
        }
    }
}

/// Startup migration behaviour, decided once at boot.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub apply_on_startup: bool,
    pub directory: PathBuf,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
}

impl CorsConfig {
    pub fn is_wildcard_included(&self) -> bool {
        self.allowed_origins
            .iter()
            .any(|origin| origin.trim() == "*")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
