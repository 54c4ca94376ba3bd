use axum::{extract::FromRequestParts, http::request::Parts};

use super::{claims::Claims, jwt::AuthError};

/// Identity established from a validated credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Scheme that vouched for this identity, e.g. `Bearer`.
    pub scheme: &'static str,
    pub claims: Claims,
}

impl AuthenticatedUser {
    pub fn subject(&self) -> Option<&str> {
        self.claims.sub.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.claims.name.as_deref()
    }
}

/// Result of the authentication stage, stored in request extensions for
/// every request that passes through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthenticationOutcome {
    #[default]
    Anonymous,
    Authenticated(AuthenticatedUser),
    Failed(AuthError),
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthenticationOutcome>() {
            Some(AuthenticationOutcome::Authenticated(user)) => Ok(user.clone()),
            Some(AuthenticationOutcome::Failed(err)) => Err(err.clone()),
            Some(AuthenticationOutcome::Anonymous) | None => {
                Err(AuthError::MissingToken)
            }
        }
    }
}
