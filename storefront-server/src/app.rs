use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method},
    middleware,
    routing::get,
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    auth::middleware::authenticate,
    docs,
    handlers::health,
    infra::{app_state::AppState, config::CorsConfig},
    routes,
};

/// Assemble the request pipeline.
///
/// Layers added later wrap the earlier ones, so a request meets them in
/// this order:
/// 1. tracing (outermost)
/// 2. CORS
/// 3. bearer authentication, which only records the outcome
/// 4. per-route authorization on routes that opt into a policy
pub fn create_app(state: AppState) -> Router {
    let config = state.config();

    let mut app = Router::new()
        .route("/ping", get(health::ping))
        .route("/health", get(health::health))
        .merge(routes::create_api_router());

    if config.is_development() {
        info!(
            ui = docs::SWAGGER_UI_PATH,
            document = docs::OPENAPI_JSON_PATH,
            "API documentation enabled"
        );
        app = app.merge(docs::docs_router());
    }

    let cors_layer = build_cors_layer(&config.cors, config.is_development());

    app.layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Permissive in development, allow-list everywhere else. Entries were
/// validated at config load; anything unparsable is skipped.
fn build_cors_layer(cors: &CorsConfig, development: bool) -> CorsLayer {
    if development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|s| HeaderValue::from_str(s.trim()).ok())
        .collect();
    // tower-http refuses credentials alongside a wildcard origin.
    let allow_credentials = cors.allow_credentials && !origins.is_empty();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    let methods: Vec<Method> = cors
        .allowed_methods
        .iter()
        .filter_map(|m| Method::from_bytes(m.as_bytes()).ok())
        .collect();

    let headers: Vec<HeaderName> = cors
        .allowed_headers
        .iter()
        .filter_map(|h| HeaderName::from_bytes(h.as_bytes()).ok())
        .collect();

    let mut layer = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::list(methods))
        .allow_headers(AllowHeaders::list(headers));

    if allow_credentials {
        layer = layer.allow_credentials(true);
    }

    layer
}
