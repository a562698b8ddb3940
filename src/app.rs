/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config 読み込み → 依存生成 (pool, repos, auth, policy, id codec) → Router 組み立て
 * - Middleware の適用 (auth filter → security headers → CORS → HTTP 横断)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    middleware,
    repos::{PgExamSlotRepository, PgRequestRepository, PgUserRepository},
    services::{
        auth::{build_access_policy, build_auth_service, build_id_token_verifier},
        id_codec::IdCodec,
    },
    state::AppState,
};

fn init_tracing() {
    // RUST_LOG wins when set, e.g.
    // RUST_LOG=info,eims_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr may be hidden depending on how the process is launched
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_app(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .context("failed to connect to the database")?;

    if config.database_run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run database migrations")?;
        tracing::info!("database migrations applied");
    }

    let auth = build_auth_service(config)?;
    let id_tokens = build_id_token_verifier(config)?;
    let policy = build_access_policy(config)?;
    tracing::info!(rules = policy.rules().len(), "access policy loaded");

    let id_codec = IdCodec::new(config.sqids_min_length, &config.sqids_alphabet)?;

    Ok(AppState::new(
        Arc::new(PgUserRepository::new(pool.clone())),
        Arc::new(PgExamSlotRepository::new(pool.clone())),
        Arc::new(PgRequestRepository::new(pool)),
        auth,
        id_tokens,
        policy,
        id_codec,
    ))
}

/// Routes plus the bearer filter, with state applied. No cross-cutting HTTP layers.
pub fn router(state: AppState) -> Router {
    let routes = api::routes();
    middleware::auth::access::apply(routes, state.clone()).with_state(state)
}

fn build_app(state: AppState, config: &Config) -> Router {
    let app = router(state);
    let app = middleware::security_headers::apply(app);
    let app = middleware::cors::apply(app, config);
    middleware::http::apply(app)
}
