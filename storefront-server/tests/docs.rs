use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::Value;
use storefront_server::{
    docs::{OPENAPI_JSON_PATH, SWAGGER_UI_PATH},
    infra::config::AppEnvironment,
};
use tower::ServiceExt;

mod common;
use common::test_app;

async fn get(environment: AppEnvironment, path: &str) -> (StatusCode, Vec<u8>) {
    let (router, _) = test_app(environment);
    let response = router
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn docs_are_served_in_development() {
    let (status, body) =
        get(AppEnvironment::Development, OPENAPI_JSON_PATH).await;
    assert_eq!(status, StatusCode::OK);

    let doc: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(doc["info"]["title"], "Storefront API");
    assert_eq!(
        doc["components"]["securitySchemes"]["Bearer"]["name"],
        "Authorization"
    );

    let (status, _) = get(AppEnvironment::Development, SWAGGER_UI_PATH).await;
    assert!(
        status.is_success() || status.is_redirection(),
        "unexpected status {status}"
    );
}

#[tokio::test]
async fn docs_are_hidden_outside_development() {
    for environment in [
        AppEnvironment::Production,
        AppEnvironment::Staging,
        AppEnvironment::Custom("qa".into()),
    ] {
        for path in [OPENAPI_JSON_PATH, SWAGGER_UI_PATH] {
            let (status, _) = get(environment.clone(), path).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{environment} {path}");
        }
    }
}
