use std::{fs::read_to_string, path::Path};

use url::Url;

use crate::{
    ConfigLoadError,
    constants::DEFAULT_DATABASE_PORT,
    models::sources::{EnvConfig, FileDatabaseConfig},
};

/// Resolve the PostgreSQL URL from, in order: `DATABASE_URL`,
/// `DATABASE_URL_FILE`, the file config `database.url`, and finally the
/// discrete `DATABASE_HOST`/`DATABASE_USER`/`DATABASE_NAME` variables.
pub fn resolve_database_url(
    env: &EnvConfig,
    file_database: &FileDatabaseConfig,
) -> Result<Option<String>, ConfigLoadError> {
    if let Some(url) = env
        .database_url
        .clone()
        .filter(|value| !value.trim().is_empty())
    {
        return Ok(Some(url));
    }

    if let Some(path) = env.database_url_file.as_ref()
        && let Some(url) = read_secret_file(path)?
    {
        return Ok(Some(url));
    }

    if let Some(ref stored_url) = file_database.url {
        let trimmed = stored_url.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let mut parsed = Url::parse(trimmed).map_err(|source| {
            ConfigLoadError::InvalidDatabaseUrl { source }
        })?;
        if parsed.password().is_none()
            && let Some(password) =
                resolve_database_password(env, file_database)?
        {
            parsed.set_password(Some(&password)).map_err(|_| {
                ConfigLoadError::InvalidDatabasePassword
            })?;
        }
        return Ok(Some(parsed.to_string()));
    }

    let host = non_blank(env.database_host.clone());
    let user = non_blank(env.database_user.clone());
    let name = non_blank(env.database_name.clone());

    if let (Some(host), Some(user), Some(name)) = (host, user, name) {
        let port = env.database_port.unwrap_or(DEFAULT_DATABASE_PORT);
        let mut url = Url::parse(&format!("postgresql://{host}:{port}/{name}"))
            .map_err(|source| ConfigLoadError::InvalidDatabaseUrl {
                source,
            })?;
        url.set_username(&user).map_err(|_| {
            ConfigLoadError::InvalidDatabaseUsername {
                username: user.clone(),
            }
        })?;
        if let Some(password) = resolve_database_password(env, file_database)? {
            url.set_password(Some(&password)).map_err(|_| {
                ConfigLoadError::InvalidDatabasePassword
            })?;
        }
        return Ok(Some(url.to_string()));
    }

    Ok(None)
}

pub fn resolve_database_password(
    env: &EnvConfig,
    file_database: &FileDatabaseConfig,
) -> Result<Option<String>, ConfigLoadError> {
    if let Some(password) = non_blank(env.database_password.clone()) {
        return Ok(Some(password));
    }

    for path in [
        env.database_password_file.as_ref(),
        file_database.password_file.as_ref(),
    ]
    .into_iter()
    .flatten()
    {
        if let Some(secret) = read_secret_file(path)? {
            return Ok(Some(secret));
        }
    }

    Ok(None)
}

/// Read a secret from disk, trimming surrounding whitespace. Blank files
/// count as unset.
pub fn read_secret_file(path: &Path) -> Result<Option<String>, ConfigLoadError> {
    let contents =
        read_to_string(path).map_err(|source| ConfigLoadError::SecretFileIo {
            path: path.to_path_buf(),
            source,
        })?;
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
