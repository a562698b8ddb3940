//! Upstream OIDC `id_token` verification for the login flow.
//!
//! The identity provider (OAuth2 / OIDC) proves who the caller is; this
//! service only accepts an email that comes out of an id_token signed by that
//! provider for this client. Signature, `iss`, `aud`, `exp` and `sub` are
//! checked the same way access tokens are.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::services::auth::{AuthError, KeyError};

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
}

/// Who the upstream provider says the caller is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamIdentity {
    /// Provider-side subject; only logged.
    pub subject: String,
    /// `None` when the token carries no email or the provider marks it unverified.
    pub email: Option<String>,
}

#[derive(Clone)]
pub struct IdTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for IdTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdTokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

fn decoding_key(algorithm: Algorithm, pem: &str) -> Result<DecodingKey, KeyError> {
    let pem = pem.as_bytes();
    let key = match algorithm {
        Algorithm::EdDSA => DecodingKey::from_ed_pem(pem),
        Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem),
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => DecodingKey::from_rsa_pem(pem),
        other => return Err(KeyError::UnsupportedAlgorithm(other)),
    };
    key.map_err(KeyError::UpstreamKey)
}

impl IdTokenVerifier {
    pub fn new(
        public_key_pem: &str,
        algorithm: Algorithm,
        issuer: &str,
        audience: &str,
        leeway_seconds: u64,
    ) -> Result<Self, KeyError> {
        let decoding_key = decoding_key(algorithm, public_key_pem)?;

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.leeway = leeway_seconds;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    pub fn verify(&self, id_token: &str) -> Result<UpstreamIdentity, AuthError> {
        let claims =
            jsonwebtoken::decode::<IdTokenClaims>(id_token, &self.decoding_key, &self.validation)?
                .claims;

        if claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidClaims("sub"));
        }

        // absent `email_verified` means the provider asserts the email as-is
        let email = claims
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .filter(|_| claims.email_verified != Some(false));

        Ok(UpstreamIdentity {
            subject: claims.sub,
            email,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    use super::*;

    const UPSTREAM_PRIVATE_PEM: &str =
        include_str!("../../../tests/fixtures/upstream_ed25519_private.pem");
    const UPSTREAM_PUBLIC_PEM: &str =
        include_str!("../../../tests/fixtures/upstream_ed25519_public.pem");
    const FOREIGN_PRIVATE_PEM: &str =
        include_str!("../../../tests/fixtures/foreign_ed25519_private.pem");

    const ISSUER: &str = "https://accounts.example.test";
    const CLIENT_ID: &str = "eims-web";

    fn verifier() -> IdTokenVerifier {
        IdTokenVerifier::new(UPSTREAM_PUBLIC_PEM, Algorithm::EdDSA, ISSUER, CLIENT_ID, 0).unwrap()
    }

    fn sign(private_pem: &str, claims: serde_json::Value) -> String {
        let key = EncodingKey::from_ed_pem(private_pem.as_bytes()).unwrap();
        jsonwebtoken::encode(&Header::new(Algorithm::EdDSA), &claims, &key).unwrap()
    }

    fn claims(email: serde_json::Value) -> serde_json::Value {
        json!({
            "iss": ISSUER,
            "aud": CLIENT_ID,
            "sub": "google-oauth2|1234",
            "exp": (Utc::now() + Duration::minutes(5)).timestamp(),
            "email": email,
        })
    }

    #[test]
    fn provider_signed_token_yields_the_email() {
        let token = sign(UPSTREAM_PRIVATE_PEM, claims(json!(" alice@fpt.edu.vn ")));

        let identity = verifier().verify(&token).unwrap();

        assert_eq!(identity.subject, "google-oauth2|1234");
        assert_eq!(identity.email.as_deref(), Some("alice@fpt.edu.vn"));
    }

    #[test]
    fn token_signed_by_anyone_else_is_rejected() {
        let token = sign(FOREIGN_PRIVATE_PEM, claims(json!("alice@fpt.edu.vn")));
        assert_eq!(verifier().verify(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn token_for_another_client_or_issuer_is_rejected() {
        let mut other_client = claims(json!("alice@fpt.edu.vn"));
        other_client["aud"] = json!("someone-else");
        assert_eq!(
            verifier().verify(&sign(UPSTREAM_PRIVATE_PEM, other_client)),
            Err(AuthError::InvalidClaims("aud"))
        );

        let mut other_issuer = claims(json!("alice@fpt.edu.vn"));
        other_issuer["iss"] = json!("https://evil.example");
        assert_eq!(
            verifier().verify(&sign(UPSTREAM_PRIVATE_PEM, other_issuer)),
            Err(AuthError::InvalidClaims("iss"))
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut expired = claims(json!("alice@fpt.edu.vn"));
        expired["exp"] = json!((Utc::now() - Duration::minutes(1)).timestamp());
        assert_eq!(
            verifier().verify(&sign(UPSTREAM_PRIVATE_PEM, expired)),
            Err(AuthError::TokenExpired)
        );
    }

    #[test]
    fn unverified_or_missing_email_yields_none() {
        let mut unverified = claims(json!("alice@fpt.edu.vn"));
        unverified["email_verified"] = json!(false);
        let identity = verifier()
            .verify(&sign(UPSTREAM_PRIVATE_PEM, unverified))
            .unwrap();
        assert_eq!(identity.email, None);

        let identity = verifier()
            .verify(&sign(UPSTREAM_PRIVATE_PEM, claims(json!(null))))
            .unwrap();
        assert_eq!(identity.email, None);
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(verifier().verify("alice@fpt.edu.vn"), Err(AuthError::Malformed));
    }

    #[test]
    fn shared_secret_algorithms_are_refused() {
        let err = IdTokenVerifier::new(UPSTREAM_PUBLIC_PEM, Algorithm::HS256, ISSUER, CLIENT_ID, 0)
            .unwrap_err();
        assert!(matches!(err, KeyError::UnsupportedAlgorithm(Algorithm::HS256)));
    }
}
