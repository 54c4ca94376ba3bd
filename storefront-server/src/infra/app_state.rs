use std::{fmt, sync::Arc};

use sqlx::PgPool;

use crate::{auth::JwtBearer, infra::config::Config};

/// Process-wide services shared with every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: PgPool,
    pub bearer: JwtBearer,
}

impl AppState {
    pub fn new(config: Arc<Config>, db: PgPool, bearer: JwtBearer) -> Self {
        Self { config, db, bearer }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_handle(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    pub fn db(&self) -> &PgPool {
        &self.db
    }

    pub fn bearer(&self) -> &JwtBearer {
        &self.bearer
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
