use std::{sync::Arc, time::Duration};

use axum::http::{StatusCode, header};
use chrono::Utc;
use serde_json::Value;
use storefront_server::{
    auth::{
        Audience, Claims, JwtBearer, SigningConfigurations,
        TokenValidationParameters,
    },
    infra::config::AppEnvironment,
};

mod common;
use common::{AUDIENCE, ISSUER, bearer, test_server};

const SESSION: &str = "/api/v1/session";

fn claims(seconds_left: i64) -> Claims {
    let now = Utc::now().timestamp();
    Claims {
        sub: Some("customer-42".into()),
        iss: ISSUER.into(),
        aud: Audience::Single(AUDIENCE.into()),
        exp: now + seconds_left,
        iat: Some(now),
        nbf: None,
        jti: None,
        name: Some("Grace".into()),
    }
}

fn challenge(response: &axum_test::TestResponse) -> String {
    response
        .headers()
        .get(header::WWW_AUTHENTICATE)
        .expect("challenge header")
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn guarded_route_without_token_is_challenged() {
    let (server, _) = test_server(AppEnvironment::Production);

    let response = server.get(SESSION).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(challenge(&response), "Bearer");
    let body: Value = response.json();
    assert_eq!(body["error"]["status"], 401);
}

#[tokio::test]
async fn valid_token_is_admitted() {
    let (server, state) = test_server(AppEnvironment::Production);
    let issued = state
        .bearer()
        .issue("customer-42", Some("Grace"), Duration::from_secs(60))
        .unwrap();

    let response = server
        .get(SESSION)
        .add_header("Authorization", bearer(&issued.access_token))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["subject"], "customer-42");
    assert_eq!(body["name"], "Grace");
    assert_eq!(body["scheme"], "Bearer");
    assert_eq!(body["issuer"], ISSUER);
    assert_eq!(body["audience"][0], AUDIENCE);
    assert!(body["expiresAt"].is_string());
}

#[tokio::test]
async fn token_without_a_subject_is_admitted() {
    let (server, state) = test_server(AppEnvironment::Production);
    let mut anonymous_subject = claims(60);
    anonymous_subject.sub = None;
    let token = state.bearer().sign(&anonymous_subject).unwrap();

    let response = server
        .get(SESSION)
        .add_header("Authorization", bearer(&token))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body.get("subject").is_none());
    assert_eq!(body["issuer"], ISSUER);
    assert_eq!(body["audience"][0], AUDIENCE);
}

#[tokio::test]
async fn token_signed_by_an_untrusted_key_is_rejected() {
    let (server, _) = test_server(AppEnvironment::Production);
    let stranger = JwtBearer::new(
        Arc::new(SigningConfigurations::from_secret(
            b"someone-else-entirely-0123456789",
        )),
        TokenValidationParameters::new(ISSUER, AUDIENCE),
    );
    let token = stranger.sign(&claims(60)).unwrap();

    let response = server
        .get(SESSION)
        .add_header("Authorization", bearer(&token))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert!(challenge(&response).contains("error=\"invalid_token\""));
}

#[tokio::test]
async fn token_expired_by_one_second_is_rejected() {
    let (server, state) = test_server(AppEnvironment::Production);
    let token = state.bearer().sign(&claims(-1)).unwrap();

    let response = server
        .get(SESSION)
        .add_header("Authorization", bearer(&token))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert!(challenge(&response).contains("expired"));
}

#[tokio::test]
async fn wrong_issuer_or_audience_is_rejected() {
    let (server, state) = test_server(AppEnvironment::Production);

    let mut foreign_issuer = claims(60);
    foreign_issuer.iss = "https://elsewhere.test".into();
    let mut foreign_audience = claims(60);
    foreign_audience.aud = Audience::Single("back-office".into());

    for claims in [foreign_issuer, foreign_audience] {
        let token = state.bearer().sign(&claims).unwrap();
        server
            .get(SESSION)
            .add_header("Authorization", bearer(&token))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn non_bearer_credentials_are_challenged() {
    let (server, _) = test_server(AppEnvironment::Production);

    let response = server
        .get(SESSION)
        .add_header("Authorization", "Basic c2hvcDpzZWNyZXQ=")
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(challenge(&response), "Bearer");
}

#[tokio::test]
async fn public_routes_ignore_bad_tokens() {
    let (server, _) = test_server(AppEnvironment::Production);

    let response = server
        .get("/ping")
        .add_header("Authorization", bearer("definitely.not.valid"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn unknown_routes_stay_not_found() {
    let (server, _) = test_server(AppEnvironment::Production);

    server
        .get("/api/v1/nowhere")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tokens_do_not_survive_a_new_ephemeral_key() {
    let parameters = TokenValidationParameters::new(ISSUER, AUDIENCE);
    let before_restart = JwtBearer::new(
        Arc::new(SigningConfigurations::ephemeral()),
        parameters.clone(),
    );
    let after_restart =
        JwtBearer::new(Arc::new(SigningConfigurations::ephemeral()), parameters);

    let issued = before_restart
        .issue("customer-42", None, Duration::from_secs(60))
        .unwrap();

    assert!(before_restart.validate(&issued.access_token).is_ok());
    assert!(after_restart.validate(&issued.access_token).is_err());
}

#[tokio::test]
async fn health_reports_an_unreachable_database() {
    let (server, _) = test_server(AppEnvironment::Production);

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["checks"]["database"], "unreachable");
}
