use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::infra::config::ConfigWarnings;

const DEFAULT_FILTER: &str = "info,tower_http=warn,sqlx=warn";

/// Install the global subscriber. Override the filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

pub fn log_config_warnings(warnings: &ConfigWarnings, env_file_loaded: bool) {
    if env_file_loaded {
        info!("loaded .env file");
    }

    for warning in warnings.iter() {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => {
                warn!(message = %warning.message, "configuration warning")
            }
        }
    }
}
