use super::{identity::AuthenticationOutcome, jwt::AuthError};

/// Name under which routes refer to the bearer-token policy.
pub const BEARER_POLICY: &str = "Bearer";

/// A named authorization rule: which schemes may vouch for the caller and
/// whether an authenticated identity is required at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationPolicy {
    name: String,
    schemes: Vec<String>,
    require_authenticated_user: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow,
    /// No acceptable identity; the caller should authenticate. Maps to 401.
    Challenge(AuthError),
    /// Authenticated, but not through a scheme this policy accepts. Maps to 403.
    Forbid,
}

impl AuthorizationPolicy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schemes: Vec::new(),
            require_authenticated_user: false,
        }
    }

    /// The `Bearer` policy: the caller must present a valid bearer token.
    pub fn bearer() -> Self {
        Self::new(BEARER_POLICY)
            .with_scheme(super::jwt::BEARER_SCHEME)
            .require_authenticated_user()
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.schemes.push(scheme.into());
        self
    }

    pub fn require_authenticated_user(mut self) -> Self {
        self.require_authenticated_user = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schemes(&self) -> &[String] {
        &self.schemes
    }

    pub fn evaluate(&self, outcome: &AuthenticationOutcome) -> PolicyDecision {
        match outcome {
            AuthenticationOutcome::Authenticated(user) => {
                if self.schemes.is_empty()
                    || self.schemes.iter().any(|s| s == user.scheme)
                {
                    PolicyDecision::Allow
                } else {
                    PolicyDecision::Forbid
                }
            }
            _ if !self.require_authenticated_user => PolicyDecision::Allow,
            AuthenticationOutcome::Anonymous => {
                PolicyDecision::Challenge(AuthError::MissingToken)
            }
            AuthenticationOutcome::Failed(err) => {
                PolicyDecision::Challenge(err.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        claims::{Audience, Claims},
        identity::AuthenticatedUser,
    };

    fn user(scheme: &'static str) -> AuthenticationOutcome {
        AuthenticationOutcome::Authenticated(AuthenticatedUser {
            scheme,
            claims: Claims {
                sub: Some("user-1".into()),
                iss: "issuer".into(),
                aud: Audience::Single("aud".into()),
                exp: 0,
                iat: None,
                nbf: None,
                jti: None,
                name: None,
            },
        })
    }

    #[test]
    fn bearer_policy_admits_bearer_identities() {
        let policy = AuthorizationPolicy::bearer();
        assert_eq!(policy.name(), "Bearer");
        assert_eq!(policy.evaluate(&user("Bearer")), PolicyDecision::Allow);
    }

    #[test]
    fn bearer_policy_challenges_anonymous_callers() {
        let policy = AuthorizationPolicy::bearer();
        assert_eq!(
            policy.evaluate(&AuthenticationOutcome::Anonymous),
            PolicyDecision::Challenge(AuthError::MissingToken)
        );
        assert_eq!(
            policy.evaluate(&AuthenticationOutcome::Failed(AuthError::Expired)),
            PolicyDecision::Challenge(AuthError::Expired)
        );
    }

    #[test]
    fn identities_from_other_schemes_are_forbidden() {
        let policy = AuthorizationPolicy::bearer();
        assert_eq!(policy.evaluate(&user("Cookie")), PolicyDecision::Forbid);
    }

    #[test]
    fn open_policy_admits_anyone() {
        let policy = AuthorizationPolicy::new("Open");
        assert_eq!(
            policy.evaluate(&AuthenticationOutcome::Anonymous),
            PolicyDecision::Allow
        );
    }
}
