//! CORS policy for browser clients (Swagger UI, the web front end).
//!
//! - Development: permissive (Allow-Origin: *), WITHOUT credentials.
//! - Production: exact-match allowlist from `CORS_ALLOWED_ORIGINS`, WITHOUT credentials.
//!   An empty allowlist allows no origin.
//!
//! Tokens travel in the `Authorization` header, never in cookies, so credentials stay off.

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;

/// Apply CORS policy to the given Router.
///
/// IMPORTANT:
/// - Do not combine wildcard origin (`Any`) with `allow_credentials(true)`.
pub fn apply(router: Router, config: &Config) -> Router {
    router.layer(layer(config.app_env.is_production(), &config.cors_allowed_origins))
}

/// Production matches the `Origin` header exactly against the allowlist;
/// entries that are not valid header values are dropped.
fn layer(production: bool, allowed_origins: &[String]) -> CorsLayer {
    let cors = if production {
        let allowed: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        CorsLayer::new().allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _req| allowed.iter().any(|v| v == origin),
        ))
    } else {
        CorsLayer::new().allow_origin(Any)
    };

    cors.allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ])
    .allow_headers([
        header::AUTHORIZATION,
        header::CONTENT_TYPE,
        header::ACCEPT,
        HeaderName::from_static("x-request-id"),
    ])
    .expose_headers([header::LOCATION, HeaderName::from_static("x-request-id")])
    .max_age(Duration::from_secs(60 * 10))
}
