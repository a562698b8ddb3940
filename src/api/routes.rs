/*
 * Responsibility
 * - URL 構造を定義 (prefix なし, root に mount)
 * - 認証の要否はここでは決めない (AccessPolicy + access middleware が判断)
 */
use axum::{Router, routing::get, routing::post};

use crate::state::AppState;

use crate::api::handlers::{
    docs::{SWAGGER_UI_INDEX, openapi_json, swagger_ui, swagger_ui_redirect},
    exam_slots::{
        create_exam_slot, delete_exam_slot, get_exam_slot, list_exam_slots, update_exam_slot,
    },
    health::health,
    oauth::{login, logout},
    requests::{create_request, delete_request, get_request, list_requests, update_request},
    users::{create_user, delete_user, get_user, list_users, update_user, user_info},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/v1/oauth/login", post(login))
        .route("/v1/oauth/logout", post(logout))
        .route("/users", get(list_users).post(create_user))
        // static segment wins over /users/{fu_id}
        .route("/users/userInfo", get(user_info))
        .route(
            "/users/{fu_id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/exam-slots", get(list_exam_slots).post(create_exam_slot))
        .route(
            "/exam-slots/{id}",
            get(get_exam_slot)
                .put(update_exam_slot)
                .delete(delete_exam_slot),
        )
        .route("/requests", get(list_requests).post(create_request))
        .route(
            "/requests/{id}",
            get(get_request).put(update_request).delete(delete_request),
        )
        .route("/v3/api-docs", get(openapi_json))
        .route("/v3/api-docs/openapi.json", get(openapi_json))
        .route(SWAGGER_UI_INDEX, get(swagger_ui))
        .route("/swagger-ui.html", get(swagger_ui_redirect))
}
