use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::User;
use crate::error::AppError;
use crate::services::auth::jwt::{IssuedAccessToken, JwtIssuer, KeyError};

/// Why a request could not be authenticated.
///
/// Only ever logged. Every variant is answered with the same 401 so callers
/// cannot tell which check failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing credential")]
    MissingCredential,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("malformed token")]
    Malformed,
    #[error("token expired")]
    TokenExpired,
    #[error("invalid '{0}' claim")]
    InvalidClaims(&'static str),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::TokenExpired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidIssuer => Self::InvalidClaims("iss"),
            ErrorKind::InvalidAudience => Self::InvalidClaims("aud"),
            ErrorKind::InvalidSubject => Self::InvalidClaims("sub"),
            ErrorKind::ImmatureSignature => Self::InvalidClaims("nbf"),
            ErrorKind::MissingRequiredClaim(_) => Self::InvalidClaims("required"),
            _ => Self::Malformed,
        }
    }
}

fn aud_is_present_and_valid(aud: &serde_json::Value) -> bool {
    match aud {
        serde_json::Value::String(s) => !s.trim().is_empty(),
        serde_json::Value::Array(arr) => arr.iter().any(|v| match v {
            serde_json::Value::String(s) => !s.trim().is_empty(),
            _ => false,
        }),
        // Missing claim ends up as Null due to #[serde(default)]
        _ => false,
    }
}

/// Access token (JWT) claims as read back from the wire.
///
/// `aud` may be a string or an array; `Validation::set_audience` checks it.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    pub iss: String,
    #[serde(default)]
    pub aud: serde_json::Value,

    pub sub: String,
    pub exp: i64,

    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub jti: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Verified token, converted into what the rest of the app works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedAccessToken {
    pub subject: String,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub roles: Vec<String>,
    pub jti: Option<String>,
}

/// Issues and verifies EdDSA (Ed25519) access tokens.
///
/// Key material is not printable via Debug.
#[derive(Clone)]
pub struct AuthService {
    issuer: JwtIssuer,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("issuer", &self.issuer)
            .field("validation", &self.validation)
            .finish()
    }
}

impl AuthService {
    pub fn new(
        issuer: JwtIssuer,
        access_public_key_pem: &str,
        leeway_seconds: u64,
    ) -> Result<Self, KeyError> {
        let decoding_key = DecodingKey::from_ed_pem(access_public_key_pem.as_bytes())
            .map_err(KeyError::PublicKey)?;

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_issuer(&[issuer.issuer()]);
        validation.set_audience(&[issuer.audience()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.leeway = leeway_seconds;

        Ok(Self {
            issuer,
            decoding_key,
            validation,
        })
    }

    pub fn issuer(&self) -> &JwtIssuer {
        &self.issuer
    }

    /// Issue an access token for a registered user (`sub` = fuId, `roles` = [role]).
    pub fn issue_access_token(&self, user: &User) -> Result<IssuedAccessToken, AppError> {
        self.issuer
            .issue(&user.fu_id, &[user.role.as_str().to_string()])
    }

    /// Signature, `exp`, `iss` and `aud` checks, done by jsonwebtoken.
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        let data =
            jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)?;

        Ok(data.claims)
    }

    /// `verify` plus non-empty `iss`/`sub`/`aud`, then conversion for the request context.
    pub fn verify_verified(&self, token: &str) -> Result<VerifiedAccessToken, AuthError> {
        let claims = self.verify(token)?;

        if claims.iss.trim().is_empty() {
            return Err(AuthError::InvalidClaims("iss"));
        }
        if claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidClaims("sub"));
        }
        if !aud_is_present_and_valid(&claims.aud) {
            return Err(AuthError::InvalidClaims("aud"));
        }

        let expires_at =
            DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::InvalidClaims("exp"))?;
        let issued_at = claims.iat.and_then(|iat| DateTime::from_timestamp(iat, 0));

        Ok(VerifiedAccessToken {
            subject: claims.sub,
            issued_at,
            expires_at,
            roles: claims.roles,
            jti: claims.jti,
        })
    }
}
