pub mod access_jwt;
pub mod factory;
pub mod id_token;
pub mod jwt;
pub mod policy;

pub use access_jwt::{AuthError, AuthService, VerifiedAccessToken};
pub use factory::{build_access_policy, build_auth_service, build_id_token_verifier};
pub use id_token::{IdTokenVerifier, UpstreamIdentity};
pub use jwt::{IssuedAccessToken, JwtIssuer, KeyError};
pub use policy::{AccessPolicy, AccessRule, PathPattern, PatternError, Requirement};
