/// Factory: build the auth collaborators from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{
    AccessPolicy, AuthService, IdTokenVerifier, JwtIssuer, KeyError, PatternError,
};

pub fn build_auth_service(config: &Config) -> Result<Arc<AuthService>, KeyError> {
    let issuer = JwtIssuer::new(
        &config.access_jwt_private_key_pem,
        config.auth_issuer.clone(),
        config.auth_audience.clone(),
        config.access_token_ttl_seconds,
    )?;

    let auth = AuthService::new(
        issuer,
        &config.access_jwt_public_key_pem,
        config.access_token_leeway_seconds,
    )?;

    Ok(Arc::new(auth))
}

pub fn build_access_policy(config: &Config) -> Result<Arc<AccessPolicy>, PatternError> {
    let policy = AccessPolicy::with_defaults(&config.extra_public_paths)?;
    Ok(Arc::new(policy))
}

pub fn build_id_token_verifier(config: &Config) -> Result<Arc<IdTokenVerifier>, KeyError> {
    let verifier = IdTokenVerifier::new(
        &config.upstream_id_token_public_key_pem,
        config.upstream_id_token_algorithm,
        &config.upstream_id_token_issuer,
        &config.upstream_id_token_audience,
        config.access_token_leeway_seconds,
    )?;
    Ok(Arc::new(verifier))
}
