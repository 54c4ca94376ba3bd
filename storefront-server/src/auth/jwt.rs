use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    Header, Validation, decode, encode,
    errors::{Error as JwtError, ErrorKind},
};
use storefront_config::AuthConfig;
use thiserror::Error;
use uuid::Uuid;

use super::{
    claims::{Audience, Claims},
    signing::SigningConfigurations,
};

/// Scheme name used in the `Authorization` header and in challenges.
pub const BEARER_SCHEME: &str = "Bearer";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authentication required")]
    MissingToken,
    #[error("token has expired")]
    Expired,
    #[error("token is not valid yet")]
    NotYetValid,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token issuer is not trusted")]
    InvalidIssuer,
    #[error("token audience is not accepted")]
    InvalidAudience,
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl AuthError {
    /// True for failures of a presented token, as opposed to no token at all.
    pub fn is_invalid_token(&self) -> bool {
        !matches!(self, AuthError::MissingToken | AuthError::Signing(_))
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::ImmatureSignature => AuthError::NotYetValid,
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                AuthError::InvalidSignature
            }
            ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
            ErrorKind::InvalidAudience => AuthError::InvalidAudience,
            _ => AuthError::Malformed(err.to_string()),
        }
    }
}

/// What a presented token must satisfy to be admitted.
#[derive(Debug, Clone)]
pub struct TokenValidationParameters {
    pub issuer: String,
    pub audience: String,
    /// Tolerance applied to `exp` and `nbf`. Zero means expiry is exact.
    pub clock_skew: Duration,
}

impl TokenValidationParameters {
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            clock_skew: Duration::ZERO,
        }
    }

    pub fn from_config(auth: &AuthConfig) -> Self {
        Self::new(auth.issuer.clone(), auth.audience.clone())
    }
}

/// A freshly minted access token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub claims: Claims,
}

/// Validates and issues bearer tokens against one signing configuration.
#[derive(Clone)]
pub struct JwtBearer {
    signing: Arc<SigningConfigurations>,
    parameters: Arc<TokenValidationParameters>,
    validation: Arc<Validation>,
}

impl JwtBearer {
    pub fn new(
        signing: Arc<SigningConfigurations>,
        parameters: TokenValidationParameters,
    ) -> Self {
        let mut validation = Validation::new(signing.algorithm());
        validation.leeway = parameters.clock_skew.as_secs();
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_issuer(&[parameters.issuer.as_str()]);
        validation.set_audience(&[parameters.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        Self {
            signing,
            parameters: Arc::new(parameters),
            validation: Arc::new(validation),
        }
    }

    pub fn parameters(&self) -> &TokenValidationParameters {
        &self.parameters
    }

    pub fn signing(&self) -> &SigningConfigurations {
        &self.signing
    }

    /// Check signature, issuer, audience and lifetime of `token`.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(
            token,
            self.signing.decoding_key(),
            &self.validation,
        )?;
        Ok(data.claims)
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(
            &Header::new(self.signing.algorithm()),
            claims,
            self.signing.encoding_key(),
        )
        .map_err(|err| AuthError::Signing(err.to_string()))
    }

    /// Mint a token for `subject` that the validator of this process accepts.
    pub fn issue(
        &self,
        subject: &str,
        name: Option<&str>,
        lifetime: Duration,
    ) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let lifetime = chrono::Duration::from_std(lifetime)
            .map_err(|err| AuthError::Signing(err.to_string()))?;
        let expires_at = now + lifetime;

        let claims = Claims {
            sub: Some(subject.to_string()),
            iss: self.parameters.issuer.clone(),
            aud: Audience::Single(self.parameters.audience.clone()),
            exp: expires_at.timestamp(),
            iat: Some(now.timestamp()),
            nbf: Some(now.timestamp()),
            jti: Some(Uuid::new_v4().to_string()),
            name: name.map(str::to_string),
        };

        Ok(IssuedToken {
            access_token: self.sign(&claims)?,
            token_type: BEARER_SCHEME,
            expires_at,
            claims,
        })
    }
}

impl std::fmt::Debug for JwtBearer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtBearer")
            .field("signing", &self.signing)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}
