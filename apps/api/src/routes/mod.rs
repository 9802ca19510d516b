pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::courses::handlers as courses;
use crate::errors::AppError;
use crate::resume::handlers as resumes;
use crate::roadmap::handlers as roadmaps;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Resume API
        .route(
            "/api/v1/resumes/analyze",
            post(resumes::handle_analyze_resume).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/v1/resumes/roadmap",
            post(roadmaps::handle_resume_roadmap),
        )
        // Roadmap API
        .route(
            "/api/v1/roadmaps/generate",
            post(roadmaps::handle_generate_roadmap),
        )
        .route("/api/v1/roadmaps/courses", post(courses::handle_rank_courses))
        // Goal API
        .route("/api/v1/goals/enhance", post(roadmaps::handle_enhance_goal))
        .fallback(not_found)
        .with_state(state)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}
