//! Bearer authentication and policy based authorization.

pub mod claims;
pub mod identity;
pub mod jwt;
pub mod middleware;
pub mod policy;
pub mod signing;

pub use claims::{Audience, Claims};
pub use identity::{AuthenticatedUser, AuthenticationOutcome};
pub use jwt::{
    AuthError, BEARER_SCHEME, IssuedToken, JwtBearer, TokenValidationParameters,
};
pub use policy::{AuthorizationPolicy, BEARER_POLICY, PolicyDecision};
pub use signing::{KeyProvenance, SigningConfigurations, SigningError};
