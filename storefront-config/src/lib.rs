//! Shared configuration library for the Storefront API.
//!
//! Configuration is composed from three layers, highest precedence first:
//! process environment (optionally seeded from a `.env` file), an optional
//! `storefront.toml`, and built-in defaults. The composed [`Config`] is read
//! once at boot and handed to the server as an immutable value.

pub mod constants;
pub mod loader;
pub mod models;
pub mod util;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, ConfigLoaderOptions, error::ConfigLoadError};
pub use models::sources::{EnvConfig, FileConfig};
pub use models::{
    AppEnvironment, AuthConfig, Config, ConfigMetadata, CorsConfig,
    DatabaseConfig, MigrationConfig, ServerConfig, SigningKeySource,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
