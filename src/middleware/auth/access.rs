//! Bearer token filter: resolve the access rule, verify the JWT, put the `Principal` in extensions.
//!
//! Runs once per request, before routing. Per request there are two states:
//! unauthenticated (initial) and authenticated (only after a successful verify).
//!
//! - no token + public path        -> pass through
//! - no token + authenticated path -> 401
//! - valid token                   -> Principal attached, pass through
//! - invalid token + public path   -> token ignored, pass through
//! - invalid token otherwise       -> 401
//!
//! Every 401 is the same response; the reason only goes to the log.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::Principal;
use crate::error::AppError;
use crate::services::auth::{AuthError, Requirement};
use crate::state::AppState;

/// Wrap every route of `router` (fallback included) with the filter.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

/// `Authorization: Bearer <token>`. Anything else counts as no credential.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let requirement = state.policy.resolve(req.uri().path());

    let Some(token) = bearer_token(req.headers()) else {
        return match requirement {
            Requirement::Public => Ok(next.run(req).await),
            Requirement::Authenticated => {
                tracing::debug!(
                    path = %req.uri().path(),
                    error = %AuthError::MissingCredential,
                    "rejecting unauthenticated request"
                );
                Err(AppError::Unauthorized)
            }
        };
    };

    match state.auth.verify_verified(&token) {
        Ok(verified) => {
            // middleware → extractor への受け渡し
            req.extensions_mut().insert(Principal::from(verified));
            Ok(next.run(req).await)
        }
        Err(err) if requirement == Requirement::Public => {
            tracing::debug!(
                path = %req.uri().path(),
                error = %err,
                "ignoring invalid access token on public path"
            );
            Ok(next.run(req).await)
        }
        Err(err) => {
            tracing::warn!(
                path = %req.uri().path(),
                error = %err,
                "access token verification failed"
            );
            Err(AppError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn extracts_only_bearer_credentials() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer mytoken123"),
        );
        assert_eq!(bearer_token(&headers), Some("mytoken123".to_string()));
    }
}
