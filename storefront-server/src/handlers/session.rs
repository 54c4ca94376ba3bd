use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::AuthenticatedUser;

/// The identity behind the presented bearer token.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub scheme: String,
    pub issuer: String,
    pub audience: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

impl From<AuthenticatedUser> for SessionResponse {
    fn from(user: AuthenticatedUser) -> Self {
        let claims = user.claims;
        Self {
            subject: claims.sub,
            name: claims.name,
            scheme: user.scheme.to_string(),
            issuer: claims.iss,
            audience: claims.aud.to_vec(),
            expires_at: DateTime::<Utc>::from_timestamp(claims.exp, 0)
                .unwrap_or_default(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/session",
    tag = "session",
    security(("Bearer" = [])),
    responses(
        (status = 200, description = "Caller identity", body = SessionResponse),
        (status = 401, description = "Missing or invalid bearer token", body = crate::errors::ErrorResponse),
        (status = 403, description = "Identity not admitted by the Bearer policy", body = crate::errors::ErrorResponse)
    )
)]
pub async fn current_session(user: AuthenticatedUser) -> Json<SessionResponse> {
    Json(SessionResponse::from(user))
}
