mod config;
mod error;
mod handlers;
mod identity;
mod metrics;
mod models;
mod rate_limit;
mod state;
mod store;
mod upstream;

use axum::{
    Router,
    routing::{get, post},
};
use clap::Parser;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Args;
use crate::handlers::{
    ai_mode_handler, chat_handler, health_handler, method_not_allowed, metrics_handler,
    preflight_handler,
};
use crate::state::{AppState, build_quota_tracker};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // parse cli arguments
    let args = Args::parse();
    let chat = args.chat_config();
    let quota = args.quota_config();

    if chat.api_key.is_none() {
        tracing::warn!("no upstream API key configured, /api/chat will answer 500");
    }

    let tracker = build_quota_tracker(args.store_url.as_deref(), args.store_token.clone(), quota);
    let state = match AppState::new(chat, tracker) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            tracing::error!(error = %e, "failed to build upstream client");
            std::process::exit(1);
        }
    };
    metrics::register();

    let app = app(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    tracing::info!(port = args.port, "chat gateway listening");
    tracing::info!(upstream = %args.upstream_url, model = %args.model, "forwarding completions");
    tracing::info!(
        limit = quota.limit,
        window_days = quota.window.num_days(),
        "quota per caller"
    );
    axum::serve(listener, app).await.expect("server failed");
}

// creating the router with routes
fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let chat = Router::new()
        .route(
            "/api/chat",
            post(chat_handler)
                .options(preflight_handler)
                .fallback(method_not_allowed),
        )
        .layer(cors);

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route(
            "/api/ai-mode",
            post(ai_mode_handler).fallback(method_not_allowed),
        )
        .merge(chat)
        .with_state(state)
}
