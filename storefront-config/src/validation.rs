use axum::http::{Method, header::HeaderName};
use thiserror::Error;

use super::models::{AuthConfig, Config, CorsConfig};

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error(
        "no signing key configured in Production; tokens would not survive a restart"
    )]
    EphemeralKeyInProduction,
    #[error("CORS wildcard origins are not allowed in {environment}")]
    DangerousCorsWildcard { environment: String },
    #[error("invalid CORS configuration: {reason}")]
    InvalidCorsConfig { reason: String },
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    check_signing_key(config, &mut warnings)?;

    if !config.is_development() && config.cors.is_wildcard_included() {
        return Err(ConfigGuardRailError::DangerousCorsWildcard {
            environment: config.environment.to_string(),
        });
    }

    validate_cors(&config.cors)?;

    if config.cors.allow_credentials && config.cors.is_wildcard_included() {
        warnings.push(
            "CORS credentials allowed alongside wildcard origin; browsers will reject such configuration",
        );
    }

    if config.database.primary_url.is_none() {
        warnings.push_with_hint(
            "No PostgreSQL connection configured; serving and `db migrate` will refuse to start",
            "Set DATABASE_URL, DATABASE_URL_FILE, or DATABASE_HOST/DATABASE_USER/DATABASE_NAME",
        );
    }

    if config.migrations.apply_on_startup
        && !config.migrations.directory.is_dir()
    {
        warnings.push_with_hint(
            format!(
                "APPLY_MIGRATIONS is enabled but {} is not a directory",
                config.migrations.directory.display()
            ),
            "Set MIGRATIONS_DIR to the folder holding the SQL migrations",
        );
    }

    Ok(warnings)
}

fn check_signing_key(
    config: &Config,
    warnings: &mut ConfigWarnings,
) -> Result<(), ConfigGuardRailError> {
    let AuthConfig {
        signing_key,
        allow_ephemeral_key,
        ..
    } = &config.auth;

    if !signing_key.is_ephemeral() {
        return Ok(());
    }

    if config.environment.is_production() && !allow_ephemeral_key {
        return Err(ConfigGuardRailError::EphemeralKeyInProduction);
    }

    warnings.push_with_hint(
        "No signing key configured; generating an ephemeral key for this process",
        "Tokens are invalidated on restart. Set AUTH_SIGNING_KEY or the AUTH_SIGNING_*_KEY_FILE pair",
    );
    Ok(())
}

fn validate_cors(cors: &CorsConfig) -> Result<(), ConfigGuardRailError> {
    if cors.allowed_methods.is_empty() {
        return Err(ConfigGuardRailError::InvalidCorsConfig {
            reason:
                "CORS_ALLOWED_METHODS must include at least one HTTP method"
                    .into(),
        });
    }

    for method in &cors.allowed_methods {
        Method::from_bytes(method.as_bytes()).map_err(|_| {
            ConfigGuardRailError::InvalidCorsConfig {
                reason: format!(
                    "invalid HTTP method `{}` in CORS_ALLOWED_METHODS",
                    method
                ),
            }
        })?;
    }

    if cors.allowed_headers.is_empty() {
        return Err(ConfigGuardRailError::InvalidCorsConfig {
            reason:
                "CORS_ALLOWED_HEADERS must include at least one header name"
                    .into(),
        });
    }

    for header in &cors.allowed_headers {
        HeaderName::from_bytes(header.as_bytes()).map_err(|_| {
            ConfigGuardRailError::InvalidCorsConfig {
                reason: format!(
                    "invalid header name `{}` in CORS_ALLOWED_HEADERS",
                    header
                ),
            }
        })?;
    }

    Ok(())
}
