use std::sync::Arc;

use axum::{Router, middleware, routing::get};

use crate::{
    auth::{AuthorizationPolicy, middleware::authorize},
    handlers::session,
    infra::app_state::AppState,
};

pub const SESSION: &str = "/session";

pub fn create_v1_router() -> Router<AppState> {
    Router::new().merge(create_bearer_routes())
}

/// Routes that require the `Bearer` policy. `route_layer` keeps unknown
/// paths on 404 instead of turning them into challenges.
fn create_bearer_routes() -> Router<AppState> {
    Router::new()
        .route(SESSION, get(session::current_session))
        .route_layer(middleware::from_fn_with_state(
            Arc::new(AuthorizationPolicy::bearer()),
            authorize,
        ))
}
