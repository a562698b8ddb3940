use std::convert::Infallible;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

use super::Principal;

/// Handler で Principal を受け取るための extractor
/// middleware が Principal を request.extensions() に insert 済みである前提
/// 見つからない場合は 401 を返す（public path で token なし、もしくは middleware 未設定）
pub struct CurrentPrincipal(pub Principal);

impl FromRequestParts<AppState> for CurrentPrincipal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentPrincipal)
            .ok_or(AppError::Unauthorized)
    }
}

/// `Option<CurrentPrincipal>` for public endpoints that only care whether a
/// valid token happened to be sent.
impl OptionalFromRequestParts<AppState> for CurrentPrincipal {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Principal>().cloned().map(CurrentPrincipal))
    }
}
