use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::error::AppError;

/// Key material could not be loaded. Startup-only; never produced per request.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid ed25519 private key pem (expected PKCS#8): {0}")]
    PrivateKey(#[source] jsonwebtoken::errors::Error),
    #[error("invalid ed25519 public key pem: {0}")]
    PublicKey(#[source] jsonwebtoken::errors::Error),
    #[error("invalid upstream id_token public key pem: {0}")]
    UpstreamKey(#[source] jsonwebtoken::errors::Error),
    #[error("unsupported upstream id_token algorithm: {0:?}")]
    UnsupportedAlgorithm(Algorithm),
}

#[derive(Debug, Serialize)]
struct AccessTokenClaims<'a> {
    iss: &'a str,
    aud: &'a str,
    sub: &'a str,
    iat: i64,
    exp: i64,
    jti: String,
    roles: &'a [String],
}

/// A freshly signed access token.
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub expires_in: u64,
}

/// Signs access tokens with the service's Ed25519 key.
#[derive(Clone)]
pub struct JwtIssuer {
    issuer: String,
    audience: String,
    ttl_seconds: u64,
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for JwtIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl JwtIssuer {
    /// `private_key_pem` must be an Ed25519 private key in PKCS#8 PEM format.
    pub fn new(
        private_key_pem: &str,
        issuer: String,
        audience: String,
        ttl_seconds: u64,
    ) -> Result<Self, KeyError> {
        let encoding_key =
            EncodingKey::from_ed_pem(private_key_pem.as_bytes()).map_err(KeyError::PrivateKey)?;

        Ok(Self {
            issuer,
            audience,
            ttl_seconds,
            encoding_key,
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn issue(&self, subject: &str, roles: &[String]) -> Result<IssuedAccessToken, AppError> {
        self.issue_at(subject, roles, Utc::now())
    }

    /// Issue a token as if "now" were `issued_at`.
    pub fn issue_at(
        &self,
        subject: &str,
        roles: &[String],
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedAccessToken, AppError> {
        let iat = issued_at.timestamp();
        let exp = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(|ttl| iat.checked_add(ttl))
            .ok_or_else(|| {
                error!(ttl_seconds = self.ttl_seconds, "access token ttl out of range");
                AppError::Internal
            })?;

        let claims = AccessTokenClaims {
            iss: &self.issuer,
            aud: &self.audience,
            sub: subject,
            iat,
            exp,
            jti: Uuid::new_v4().to_string(),
            roles,
        };

        let token = self.sign(&claims)?;
        let expires_at = DateTime::from_timestamp(exp, 0).ok_or(AppError::Internal)?;

        Ok(IssuedAccessToken {
            token,
            expires_at,
            expires_in: self.ttl_seconds,
        })
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, AppError> {
        let mut header = Header::new(Algorithm::EdDSA);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            AppError::Internal
        })
    }
}
