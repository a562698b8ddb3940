/*
 * Responsibility
 * - /exam-slots 系 CRUD handler
 * - Path の公開 ID は PublicExamSlotId extractor で decode 済み
 * - createdBy / updatedBy は Principal.subject から埋める
 */
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{
    api::{
        dto::exam_slots::{ExamSlotRequest, ExamSlotResponse},
        extractors::{CurrentPrincipal, PublicExamSlotId},
    },
    domain::ExamSlot,
    error::{AppError, ErrorResponse},
    services::id_codec::IdCodec,
    state::AppState,
};

pub static EXAM_SLOTS_TAG: &str = "Exam Slot Controller";

fn exam_slot_not_found() -> AppError {
    AppError::not_found("EXAM_SLOT_NOT_FOUND", "Exam slot")
}

fn present(codec: &IdCodec, slot: ExamSlot) -> Result<ExamSlotResponse, AppError> {
    Ok(ExamSlotResponse {
        id: codec.encode(slot.id)?,
        subject_exam_id: slot.subject_exam_id,
        status: slot.status,
        created_by: slot.created_by,
        updated_by: slot.updated_by,
        created_at: slot.created_at,
        updated_at: slot.updated_at,
        start_at: slot.start_at,
        end_at: slot.end_at,
    })
}

#[utoipa::path(
    get,
    path = "/exam-slots",
    tag = EXAM_SLOTS_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All exam slots", body = Vec<ExamSlotResponse>),
        (status = 204, description = "No exam slots"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn list_exam_slots(State(state): State<AppState>) -> Result<Response, AppError> {
    let slots = state.exam_slots.list().await?;
    if slots.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let body = slots
        .into_iter()
        .map(|slot| present(&state.id_codec, slot))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(body).into_response())
}

#[utoipa::path(
    post,
    path = "/exam-slots",
    tag = EXAM_SLOTS_TAG,
    security(("bearer_auth" = [])),
    request_body = ExamSlotRequest,
    responses(
        (status = 201, description = "Exam slot created", body = ExamSlotResponse),
        (status = 400, description = "Invalid exam slot data", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 409, description = "Caller is not a registered user", body = ErrorResponse)
    )
)]
pub async fn create_exam_slot(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Json(req): Json<ExamSlotRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_FAILED", msg))?;

    let slot = state
        .exam_slots
        .create(&req.into_draft(), &principal.subject)
        .await?;
    tracing::info!(exam_slot_id = slot.id, actor = %principal.subject, "exam slot created");

    let body = present(&state.id_codec, slot)?;
    let location = format!("/exam-slots/{}", body.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(body)))
}

#[utoipa::path(
    get,
    path = "/exam-slots/{id}",
    tag = EXAM_SLOTS_TAG,
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Public exam slot id")),
    responses(
        (status = 200, description = "Exam slot", body = ExamSlotResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Unknown exam slot", body = ErrorResponse)
    )
)]
pub async fn get_exam_slot(
    State(state): State<AppState>,
    slot_id: PublicExamSlotId,
) -> Result<Json<ExamSlotResponse>, AppError> {
    let slot = state
        .exam_slots
        .get(slot_id.id)
        .await?
        .ok_or_else(exam_slot_not_found)?;

    Ok(Json(present(&state.id_codec, slot)?))
}

#[utoipa::path(
    put,
    path = "/exam-slots/{id}",
    tag = EXAM_SLOTS_TAG,
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Public exam slot id")),
    request_body = ExamSlotRequest,
    responses(
        (status = 200, description = "Exam slot updated", body = ExamSlotResponse),
        (status = 400, description = "Invalid exam slot data", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Unknown exam slot", body = ErrorResponse)
    )
)]
pub async fn update_exam_slot(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    slot_id: PublicExamSlotId,
    Json(req): Json<ExamSlotRequest>,
) -> Result<Json<ExamSlotResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_FAILED", msg))?;

    let slot = state
        .exam_slots
        .update(slot_id.id, &req.into_draft(), &principal.subject)
        .await?
        .ok_or_else(exam_slot_not_found)?;

    Ok(Json(present(&state.id_codec, slot)?))
}

#[utoipa::path(
    delete,
    path = "/exam-slots/{id}",
    tag = EXAM_SLOTS_TAG,
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Public exam slot id")),
    responses(
        (status = 204, description = "Exam slot deleted"),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Unknown exam slot", body = ErrorResponse)
    )
)]
pub async fn delete_exam_slot(
    State(state): State<AppState>,
    slot_id: PublicExamSlotId,
) -> Result<StatusCode, AppError> {
    if state.exam_slots.delete(slot_id.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(exam_slot_not_found())
    }
}
