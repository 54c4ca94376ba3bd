pub use storefront_config::{
    AppEnvironment, AuthConfig, Config, ConfigLoad, ConfigLoadError,
    ConfigLoader, ConfigMetadata, ConfigWarnings, CorsConfig, DatabaseConfig,
    EnvConfig, MigrationConfig, ServerConfig, SigningKeySource,
};
