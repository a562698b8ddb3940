//! OpenAPI document for every route served by this crate.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api::{
    dto::{
        exam_slots::{ExamSlotRequest, ExamSlotResponse},
        oauth::{LoginRequest, TokenResponse},
        requests::{RequestPayload, RequestResponse},
        users::{CreateUserRequest, UpdateUserRequest, UserResponse},
    },
    handlers::{exam_slots, health, oauth, requests, users},
};
use crate::domain::Role;
use crate::error::{ErrorBody, ErrorResponse};

/// Name referenced by `security(("bearer_auth" = []))` on handlers.
pub const BEARER_AUTH: &str = "bearer_auth";

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            BEARER_AUTH,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "API-service document",
        version = "v1.0.0",
        description = "This is a document for EISM_FUHCM API-service"
    ),
    paths(
        health::health,
        oauth::login,
        oauth::logout,
        users::list_users,
        users::create_user,
        users::user_info,
        users::get_user,
        users::update_user,
        users::delete_user,
        exam_slots::list_exam_slots,
        exam_slots::create_exam_slot,
        exam_slots::get_exam_slot,
        exam_slots::update_exam_slot,
        exam_slots::delete_exam_slot,
        requests::list_requests,
        requests::create_request,
        requests::get_request,
        requests::update_request,
        requests::delete_request,
    ),
    components(schemas(
        Role,
        ErrorResponse,
        ErrorBody,
        LoginRequest,
        TokenResponse,
        CreateUserRequest,
        UpdateUserRequest,
        UserResponse,
        ExamSlotRequest,
        ExamSlotResponse,
        RequestPayload,
        RequestResponse,
    )),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_carries_service_info() {
        let doc = ApiDoc::openapi();

        assert_eq!(doc.info.title, "API-service document");
        assert_eq!(doc.info.version, "v1.0.0");
        assert_eq!(
            doc.info.description.as_deref(),
            Some("This is a document for EISM_FUHCM API-service")
        );
    }

    #[test]
    fn document_lists_crud_paths_and_bearer_scheme() {
        let doc = ApiDoc::openapi();

        for path in [
            "/users",
            "/users/{fu_id}",
            "/users/userInfo",
            "/exam-slots/{id}",
            "/requests",
            "/v1/oauth/login",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key(BEARER_AUTH));
    }
}
