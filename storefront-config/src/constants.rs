use std::time::Duration;

pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 8080;

pub const DEFAULT_DATABASE_PORT: u16 = 5432;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

pub const DEFAULT_MIGRATIONS_DIR: &str = "./migrations";

/// Lifetime of tokens minted by the server itself.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);

/// Minimum length, in bytes, of a shared HMAC signing secret.
pub const MIN_SIGNING_SECRET_LENGTH: usize = 32;

pub const DEFAULT_CONFIG_FILE_NAMES: &[&str] =
    &["storefront.toml", "config/storefront.toml"];
