use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::{
    identity::{AuthenticatedUser, AuthenticationOutcome},
    jwt::{AuthError, BEARER_SCHEME},
    policy::{AuthorizationPolicy, PolicyDecision},
};
use crate::{errors::AppError, infra::app_state::AppState};

/// Authentication stage. Runs for every request and never rejects on its
/// own; it records who the caller is (or why they are not) for the
/// authorization stage and for extractors.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let outcome = match extract_bearer_token(request.headers()) {
        None => AuthenticationOutcome::Anonymous,
        Some(token) => match state.bearer().validate(token) {
            Ok(claims) => AuthenticationOutcome::Authenticated(AuthenticatedUser {
                scheme: BEARER_SCHEME,
                claims,
            }),
            Err(err) => {
                debug!(error = %err, path = %request.uri().path(), "bearer token rejected");
                AuthenticationOutcome::Failed(err)
            }
        },
    };

    request.extensions_mut().insert(outcome);
    next.run(request).await
}

/// Authorization stage for routes guarded by `policy`.
pub async fn authorize(
    State(policy): State<Arc<AuthorizationPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let outcome = request
        .extensions()
        .get::<AuthenticationOutcome>()
        .cloned()
        .unwrap_or_default();

    match policy.evaluate(&outcome) {
        PolicyDecision::Allow => next.run(request).await,
        PolicyDecision::Challenge(err) => err.into_response(),
        PolicyDecision::Forbid => AppError::forbidden(format!(
            "policy `{}` does not admit this caller",
            policy.name()
        ))
        .into_response(),
    }
}

/// The token of an `Authorization: Bearer <token>` header, if any. Other
/// schemes and empty tokens count as no credential.
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

impl AuthError {
    fn challenge(&self) -> HeaderValue {
        if !self.is_invalid_token() {
            return HeaderValue::from_static(BEARER_SCHEME);
        }
        let description = match self {
            AuthError::Malformed(_) => "malformed token".to_string(),
            other => other.to_string(),
        };
        HeaderValue::from_str(&format!(
            "{BEARER_SCHEME} error=\"invalid_token\", error_description=\"{description}\""
        ))
        .unwrap_or_else(|_| HeaderValue::from_static(BEARER_SCHEME))
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Signing(_) = self {
            return AppError::internal(self.to_string()).into_response();
        }
        let challenge = self.challenge();
        let mut response = AppError::unauthorized(self.to_string()).into_response();
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, challenge);
        response
    }
}
