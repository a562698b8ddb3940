/*
 * Responsibility
 * - HTTP 層の入口 (routes() の re-export)
 * - dto / extractors / handlers / openapi をまとめる
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod openapi;
mod routes;

pub use routes::routes;
