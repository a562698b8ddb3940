use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /v1/oauth/login`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// OIDC id_token issued to this client by the upstream identity provider.
    /// The login email is read from its verified claims.
    #[serde(default)]
    pub id_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    /// Always "Bearer"
    #[schema(value_type = String, example = "Bearer")]
    pub token_type: &'static str,
    /// Seconds until expiry.
    pub expires_in: u64,
}
