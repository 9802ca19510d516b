//! Axum route handlers for course recommendations.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::ranker::{RankOptions, ScoredCourse, DEFAULT_MAX_SUGGESTIONS};
use crate::errors::AppError;
use crate::roadmap::models::Roadmap;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RankRequestOptions {
    pub max_suggestions: Option<usize>,
    pub min_score: Option<u32>,
    pub goal_category: Option<String>,
    pub extra_keywords: Vec<String>,
}

impl From<RankRequestOptions> for RankOptions {
    fn from(options: RankRequestOptions) -> Self {
        RankOptions {
            max_suggestions: options.max_suggestions.unwrap_or(DEFAULT_MAX_SUGGESTIONS),
            min_score: options.min_score.unwrap_or(0),
            goal_category: options.goal_category,
            extra_keywords: options.extra_keywords,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankCoursesRequest {
    pub roadmap: Roadmap,
    #[serde(default)]
    pub options: RankRequestOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankCoursesResponse {
    pub suggestions: Vec<ScoredCourse>,
}

/// POST /api/v1/roadmaps/courses
///
/// Ranked courses for a roadmap. An empty list means nothing relevant was found.
pub async fn handle_rank_courses(
    State(state): State<AppState>,
    Json(request): Json<RankCoursesRequest>,
) -> Result<Json<RankCoursesResponse>, AppError> {
    if request.options.max_suggestions == Some(0) {
        return Err(AppError::Validation(
            "maxSuggestions must be at least 1".to_string(),
        ));
    }

    let options = RankOptions::from(request.options);
    let suggestions = state
        .courses
        .rank_courses_for_roadmap(&request.roadmap, &options);
    Ok(Json(RankCoursesResponse { suggestions }))
}
