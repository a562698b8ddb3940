/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - repos (trait object), auth: AuthService, id_tokens: IdTokenVerifier,
 *     policy: AccessPolicy, id_codec
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - 起動時に一度だけ組み立て、以後は読み取り専用
 */
use std::sync::Arc;

use crate::repos::{ExamSlotRepository, RequestRepository, UserRepository};
use crate::services::{
    auth::{AccessPolicy, AuthService, IdTokenVerifier},
    id_codec::IdCodec,
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub exam_slots: Arc<dyn ExamSlotRepository>,
    pub requests: Arc<dyn RequestRepository>,
    pub auth: Arc<AuthService>,
    pub id_tokens: Arc<IdTokenVerifier>,
    pub policy: Arc<AccessPolicy>,
    pub id_codec: IdCodec,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        exam_slots: Arc<dyn ExamSlotRepository>,
        requests: Arc<dyn RequestRepository>,
        auth: Arc<AuthService>,
        id_tokens: Arc<IdTokenVerifier>,
        policy: Arc<AccessPolicy>,
        id_codec: IdCodec,
    ) -> Self {
        Self {
            users,
            exam_slots,
            requests,
            auth,
            id_tokens,
            policy,
            id_codec,
        }
    }
}
