/*
 * Responsibility
 * - POST /v1/oauth/login: 上流 OAuth2/OIDC provider の id_token を検証し、
 *   その email が登録済みなら access token を発行する
 * - POST /v1/oauth/logout: stateless (失効させるものはない)
 * - email は request body ではなく検証済み claims からのみ取る
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::{
        dto::oauth::{LoginRequest, TokenResponse},
        extractors::CurrentPrincipal,
    },
    error::{AppError, ErrorResponse},
    state::AppState,
};

pub static OAUTH_TAG: &str = "OAuth Controller";

fn login_failed() -> AppError {
    AppError::bad_request("INVALID_ID_TOKEN", "Login failed.")
}

#[utoipa::path(
    post,
    path = "/v1/oauth/login",
    tag = OAUTH_TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 400, description = "id_token missing, invalid, or without a verified email", body = ErrorResponse),
        (status = 403, description = "Email not registered", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let id_token = req.id_token.trim();
    if id_token.is_empty() {
        return Err(login_failed());
    }

    let identity = state.id_tokens.verify(id_token).map_err(|err| {
        tracing::info!(error = %err, "login rejected: id_token verification failed");
        login_failed()
    })?;

    let Some(email) = identity.email else {
        tracing::info!(upstream_sub = %identity.subject, "login rejected: no verified email");
        return Err(AppError::bad_request(
            "EMAIL_NOT_VERIFIED",
            "Email is not verified.",
        ));
    };

    let Some(user) = state.users.find_by_email(&email).await? else {
        tracing::info!(upstream_sub = %identity.subject, "login rejected: email not registered");
        return Err(AppError::forbidden(
            "EMAIL_NOT_FOUND",
            "Your email is not permitted to log in to the system.",
        ));
    };

    let issued = state.auth.issue_access_token(&user)?;
    tracing::info!(subject = %user.fu_id, expires_at = %issued.expires_at, "access token issued");

    Ok(Json(TokenResponse {
        access_token: issued.token,
        token_type: "Bearer",
        expires_in: issued.expires_in,
    }))
}

#[utoipa::path(
    post,
    path = "/v1/oauth/logout",
    tag = OAUTH_TAG,
    responses((status = 204, description = "Logged out"))
)]
pub async fn logout(principal: Option<CurrentPrincipal>) -> StatusCode {
    if let Some(CurrentPrincipal(principal)) = principal {
        tracing::info!(subject = %principal.subject, "logout");
    }
    StatusCode::NO_CONTENT
}
