/*
 * Responsibility
 * - /users 系 CRUD handler
 * - Path/Json を extractor で受け、DTO validation → repository 呼び出し
 * - users は fuId (自然キー) をそのまま扱う (公開 ID 変換なし)
 */
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{
    api::{
        dto::users::{CreateUserRequest, UpdateUserRequest, UserResponse},
        extractors::CurrentPrincipal,
    },
    error::{AppError, ErrorResponse},
    state::AppState,
};

/// Tag for grouping user endpoints in OpenAPI documentation
pub static USERS_TAG: &str = "User Controller";

fn user_not_found() -> AppError {
    AppError::not_found("USER_NOT_FOUND", "User")
}

/// List every user. An empty table answers `204 No Content`.
#[utoipa::path(
    get,
    path = "/users",
    tag = USERS_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 204, description = "No users"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Response, AppError> {
    let users = state.users.list().await?;
    if users.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let body: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(body).into_response())
}

/// Create a user.
///
/// # Returns
/// - `201 Created` - with `Location: /users/{fuId}`
/// - `400 Bad Request` - validation failed
/// - `409 Conflict` - fuId or email already taken
#[utoipa::path(
    post,
    path = "/users",
    tag = USERS_TAG,
    security(("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid user data", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 409, description = "fuId or email already exists", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_FAILED", msg))?;

    let (fu_id, draft) = req.into_parts();
    let user = state.users.create(&fu_id, &draft).await?;
    tracing::info!(fu_id = %user.fu_id, "user created");

    let location = format!("/users/{}", user.fu_id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(UserResponse::from(user)),
    ))
}

/// The user behind the bearer token.
#[utoipa::path(
    get,
    path = "/users/userInfo",
    tag = USERS_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Token subject no longer exists", body = ErrorResponse)
    )
)]
pub async fn user_info(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .users
        .get(&principal.subject)
        .await?
        .ok_or_else(user_not_found)?;

    Ok(Json(user.into()))
}

#[utoipa::path(
    get,
    path = "/users/{fu_id}",
    tag = USERS_TAG,
    security(("bearer_auth" = [])),
    params(("fu_id" = String, Path, description = "FU identifier")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Unknown fuId", body = ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(fu_id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.users.get(&fu_id).await?.ok_or_else(user_not_found)?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/users/{fu_id}",
    tag = USERS_TAG,
    security(("bearer_auth" = [])),
    params(("fu_id" = String, Path, description = "FU identifier")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid user data", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Unknown fuId", body = ErrorResponse),
        (status = 409, description = "Email already taken", body = ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(fu_id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_FAILED", msg))?;

    let user = state
        .users
        .update(&fu_id, &req.into_draft())
        .await?
        .ok_or_else(user_not_found)?;

    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/users/{fu_id}",
    tag = USERS_TAG,
    security(("bearer_auth" = [])),
    params(("fu_id" = String, Path, description = "FU identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Unknown fuId", body = ErrorResponse),
        (status = 409, description = "User is still referenced", body = ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(fu_id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.users.delete(&fu_id).await? {
        tracing::info!(fu_id = %fu_id, "user deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(user_not_found())
    }
}
