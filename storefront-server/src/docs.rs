use axum::Router;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityRequirement, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::BEARER_POLICY,
    errors::{ErrorDetail, ErrorResponse},
    handlers::{
        health::{HealthChecks, HealthResponse, PingResponse},
        session::SessionResponse,
    },
    infra::app_state::AppState,
};

pub const SWAGGER_UI_PATH: &str = "/swagger";
pub const OPENAPI_JSON_PATH: &str = "/api-docs/v1/openapi.json";

#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "v1",
        description = "E-commerce REST API"
    ),
    paths(
        crate::handlers::health::ping,
        crate::handlers::health::health,
        crate::handlers::session::current_session,
    ),
    components(schemas(
        PingResponse,
        HealthResponse,
        HealthChecks,
        SessionResponse,
        ErrorResponse,
        ErrorDetail,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness and readiness probes"),
        (name = "session", description = "Identity of the bearer token holder")
    )
)]
pub struct ApiDoc;

/// Registers the `Bearer` scheme and requires it globally.
#[derive(Debug)]
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            BEARER_POLICY,
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "JWT Authorization header using the Bearer scheme",
            ))),
        );

        openapi.security = Some(vec![SecurityRequirement::new(
            BEARER_POLICY,
            Vec::<String>::new(),
        )]);
    }
}

/// Swagger UI plus the OpenAPI document it renders.
pub fn docs_router() -> Router<AppState> {
    SwaggerUi::new(SWAGGER_UI_PATH)
        .url(OPENAPI_JSON_PATH, ApiDoc::openapi())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_declares_the_bearer_scheme() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let scheme = &doc["components"]["securitySchemes"]["Bearer"];

        assert_eq!(scheme["type"], "apiKey");
        assert_eq!(scheme["in"], "header");
        assert_eq!(scheme["name"], "Authorization");
        assert_eq!(
            scheme["description"],
            "JWT Authorization header using the Bearer scheme"
        );
        assert_eq!(doc["security"][0]["Bearer"], serde_json::json!([]));
    }

    #[test]
    fn document_lists_every_route() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        for path in ["/ping", "/health", "/api/v1/session"] {
            assert!(doc["paths"].get(path).is_some(), "{path} missing");
        }
    }
}
