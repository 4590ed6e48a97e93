pub mod health;
pub mod stats;
pub mod timeout;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::banner_handler))
        .route("/health", get(health::health_handler))
        .route("/api/stats", get(stats::stats_handler))
        // Generation API
        .route("/generate-resume", post(handlers::handle_generate_resume))
        .route(
            "/generate-resume/batch",
            post(handlers::handle_generate_batch),
        )
        // Document API
        .route("/generate-resume/pdf", post(handlers::handle_render_pdf))
        .route("/generate-resume/docx", post(handlers::handle_render_docx))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            timeout::enforce_request_timeout,
        ))
        .with_state(state)
}
