//! Axum router configuration with middleware.
//!
//! All API routes live under `/api/`. Middleware: CORS, tracing, a 25 MB
//! body limit (inline image payloads), and per-IP rate limiting on the
//! message endpoint.
//!
//! In production the built frontend is served from disk (configurable via
//! `POPMODEL_WEB_DIR`). API routes take priority; unknown non-API paths
//! fall through to the SPA's `index.html` for client-side routing. If the
//! directory does not exist, only the API is served. Unknown `/api/*`
//! paths always answer JSON 404.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::error::AppError;
use crate::http::handlers;
use crate::http::rate_limit;
use crate::state::AppState;

const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let message_routes = Router::new()
        .route("/message", post(handlers::message::send))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit,
        ));

    let api_routes = Router::new()
        .merge(message_routes)
        // Session history
        .route("/history", get(handlers::history::list))
        .route("/history/new", post(handlers::history::create))
        .route("/history/clear", post(handlers::history::clear))
        .route("/history/{id}", get(handlers::history::get))
        .route("/history/{id}", delete(handlers::history::delete))
        .route("/history/{id}/rename", post(handlers::history::rename))
        // Memory
        .route("/memory/clear", post(handlers::memory::clear))
        // Admin
        .route("/admin/login", post(handlers::admin::login))
        // Config and models
        .route("/health", get(handlers::config::health))
        .route("/config", get(handlers::config::get_config))
        .route("/config/model", post(handlers::config::set_model))
        .route("/models", get(handlers::config::list_models))
        // TTS proxy
        .route("/tts", post(handlers::tts::speak))
        .fallback(api_not_found);

    let mut router = Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Serve the built SPA from disk if the directory exists. API routes
    // take priority; unknown paths fall through to index.html.
    let web_dir = std::env::var("POPMODEL_WEB_DIR").unwrap_or_else(|_| "web/dist".to_string());
    if std::path::Path::new(&web_dir).exists() {
        let index_path = format!("{web_dir}/index.html");
        let serve_dir = ServeDir::new(&web_dir).fallback(ServeFile::new(index_path));
        router = router.fallback_service(serve_dir);
        tracing::info!(path = %web_dir, "SPA static file serving enabled");
    }

    router
}

async fn api_not_found() -> AppError {
    AppError::NotFound("Not Found".to_string())
}
