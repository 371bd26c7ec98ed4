/*
 * Responsibility
 * - Tracing + panic hook setup
 * - Config load → dependency build → Router assembly → axum::serve
 */
use std::sync::Arc;
use std::{panic, process};

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware::auth::AllowList;
use crate::repos::{
    comment_repo::InMemoryCommentRepo, post_repo::InMemoryPostRepo, user_repo::InMemoryUserRepo,
};
use crate::services::auth::JwtService;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise a sensible default.
    // Ex: RUST_LOG=info,blog_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Surface panics via tracing so they don't get lost when stderr is
        // hidden by the launcher.
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    // Fail fast in development; keep serving in production.
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let jwt = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_ttl_seconds));
    let allow_list = Arc::new(AllowList::new(&config.allow_list)?);

    Ok(AppState::new(
        Arc::new(InMemoryUserRepo::new()),
        Arc::new(InMemoryPostRepo::new()),
        Arc::new(InMemoryCommentRepo::new()),
        jwt,
        allow_list,
    ))
}

pub fn build_router(state: AppState) -> Router {
    async fn health() -> &'static str {
        "ok"
    }

    Router::new()
        .route("/health", get(health))
        .nest("/api", api::routes::routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
