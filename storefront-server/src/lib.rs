//! # Storefront Server
//!
//! HTTP host of the Storefront REST API. The crate wires configuration,
//! bearer authentication with a named `Bearer` authorization policy, the
//! PostgreSQL pool, optional startup migrations and development-only API
//! documentation, then serves the routes.

pub mod app;
pub mod auth;
pub mod bootstrap;
pub mod db;
pub mod docs;
pub mod errors;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use app::create_app;
pub use infra::app_state::AppState;
