use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;
use crate::handler::{
    get_leaderboard_handler, health_handler, method_not_allowed_handler, not_found_handler,
    options_handler, submit_match_handler,
};
use crate::AppState;

fn cors_layer(config: &Config) -> Result<CorsLayer> {
    let allow_origin = match &config.allowed_origin {
        Some(origin) => AllowOrigin::list([HeaderValue::from_str(origin).with_context(|| {
            format!("ALLOWED_ORIGIN is not a valid header value: {}", origin)
        })?]),
        None => AllowOrigin::from(Any),
    };

    Ok(CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_origin(allow_origin)
        .allow_headers([CONTENT_TYPE]))
}

/// Build the application router: the leaderboard resource at its bare path
/// and under `/api`, plus a health probe. Unknown paths and methods answer
/// with the usual JSON error body.
pub fn create_router(state: Arc<AppState>) -> Result<Router> {
    let cors = cors_layer(&state.config)?;

    let trace_layer =
        TraceLayer::new_for_http().on_response(DefaultOnResponse::new().level(Level::INFO));

    let leaderboard = get(get_leaderboard_handler)
        .post(submit_match_handler)
        .options(options_handler)
        .fallback(method_not_allowed_handler);

    Ok(Router::new()
        .route("/leaderboard", leaderboard.clone())
        .route("/api/leaderboard", leaderboard)
        .route(
            "/health",
            get(health_handler).fallback(method_not_allowed_handler),
        )
        .fallback(not_found_handler)
        .layer(cors)
        .layer(trace_layer)
        .with_state(state))
}
