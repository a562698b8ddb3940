/*
 * Responsibility
 * - /requests 系 CRUD handler
 * - body の examSlotId (公開 ID) は handler で decode する
 * - 存在しない exam slot への参照は FK 違反 → 409 (REFERENCE_VIOLATION)
 */
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{
    api::{
        dto::requests::{RequestPayload, RequestResponse},
        extractors::{CurrentPrincipal, PublicRequestId},
    },
    domain::{Request, RequestDraft},
    error::{AppError, ErrorResponse},
    services::id_codec::IdCodec,
    state::AppState,
};

pub static REQUESTS_TAG: &str = "Request Controller";

fn request_not_found() -> AppError {
    AppError::not_found("REQUEST_NOT_FOUND", "Request")
}

fn into_draft(codec: &IdCodec, payload: RequestPayload) -> Result<RequestDraft, AppError> {
    payload
        .validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_FAILED", msg))?;

    Ok(RequestDraft {
        exam_slot_id: codec.decode(payload.exam_slot_id.trim())?,
        reason: payload.reason,
        status: payload.status,
        request_type: payload.request_type.trim().to_string(),
    })
}

fn present(codec: &IdCodec, request: Request) -> Result<RequestResponse, AppError> {
    Ok(RequestResponse {
        id: codec.encode(request.id)?,
        exam_slot_id: codec.encode(request.exam_slot_id)?,
        created_by: request.created_by,
        updated_by: request.updated_by,
        reason: request.reason,
        status: request.status,
        request_type: request.request_type,
        created_at: request.created_at,
        updated_at: request.updated_at,
    })
}

#[utoipa::path(
    get,
    path = "/requests",
    tag = REQUESTS_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All requests", body = Vec<RequestResponse>),
        (status = 204, description = "No requests"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn list_requests(State(state): State<AppState>) -> Result<Response, AppError> {
    let requests = state.requests.list().await?;
    if requests.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let body = requests
        .into_iter()
        .map(|request| present(&state.id_codec, request))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(body).into_response())
}

#[utoipa::path(
    post,
    path = "/requests",
    tag = REQUESTS_TAG,
    security(("bearer_auth" = [])),
    request_body = RequestPayload,
    responses(
        (status = 201, description = "Request created", body = RequestResponse),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 409, description = "Exam slot does not exist", body = ErrorResponse)
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Json(payload): Json<RequestPayload>,
) -> Result<impl IntoResponse, AppError> {
    let draft = into_draft(&state.id_codec, payload)?;
    let request = state.requests.create(&draft, &principal.subject).await?;
    tracing::info!(request_id = request.id, actor = %principal.subject, "request created");

    let body = present(&state.id_codec, request)?;
    let location = format!("/requests/{}", body.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(body)))
}

#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = REQUESTS_TAG,
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Public request id")),
    responses(
        (status = 200, description = "Request", body = RequestResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Unknown request", body = ErrorResponse)
    )
)]
pub async fn get_request(
    State(state): State<AppState>,
    request_id: PublicRequestId,
) -> Result<Json<RequestResponse>, AppError> {
    let request = state
        .requests
        .get(request_id.id)
        .await?
        .ok_or_else(request_not_found)?;

    Ok(Json(present(&state.id_codec, request)?))
}

#[utoipa::path(
    put,
    path = "/requests/{id}",
    tag = REQUESTS_TAG,
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Public request id")),
    request_body = RequestPayload,
    responses(
        (status = 200, description = "Request updated", body = RequestResponse),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Unknown request", body = ErrorResponse),
        (status = 409, description = "Exam slot does not exist", body = ErrorResponse)
    )
)]
pub async fn update_request(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    request_id: PublicRequestId,
    Json(payload): Json<RequestPayload>,
) -> Result<Json<RequestResponse>, AppError> {
    let draft = into_draft(&state.id_codec, payload)?;
    let request = state
        .requests
        .update(request_id.id, &draft, &principal.subject)
        .await?
        .ok_or_else(request_not_found)?;

    Ok(Json(present(&state.id_codec, request)?))
}

#[utoipa::path(
    delete,
    path = "/requests/{id}",
    tag = REQUESTS_TAG,
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Public request id")),
    responses(
        (status = 204, description = "Request deleted"),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Unknown request", body = ErrorResponse)
    )
)]
pub async fn delete_request(
    State(state): State<AppState>,
    request_id: PublicRequestId,
) -> Result<StatusCode, AppError> {
    if state.requests.delete(request_id.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(request_not_found())
    }
}
