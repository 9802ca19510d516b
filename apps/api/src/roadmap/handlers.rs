//! Axum route handlers for the Roadmap and Goal APIs.

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::{info, Instrument};
use uuid::Uuid;

use super::enhance::{enhance_goal, EnhancedGoal};
use super::models::{GoalData, TargetRequirements, UserContext};
use super::service::RoadmapOutcome;
use crate::errors::AppError;
use crate::resume::parser::ResumeProfile;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRoadmapRequest {
    pub goal: GoalData,
    #[serde(default)]
    pub user_context: UserContext,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRoadmapRequest {
    pub profile: ResumeProfile,
    #[serde(default)]
    pub target_position: String,
    #[serde(default)]
    pub target_requirements: TargetRequirements,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceGoalRequest {
    pub goal_text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/roadmaps/generate
///
/// Roadmap for a goal. Falls back to the planner when the goal lists skills.
pub async fn handle_generate_roadmap(
    State(state): State<AppState>,
    Json(request): Json<GenerateRoadmapRequest>,
) -> Result<Json<RoadmapOutcome>, AppError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("roadmap_generate", %request_id);

    async move {
        info!("Generating roadmap for goal '{}'", request.goal.name);
        let outcome = state
            .roadmaps
            .generate_roadmap_for_goal(&request.goal, &request.user_context)
            .await?;
        info!(
            "Roadmap ready: {} steps, fallback={}",
            outcome.roadmap.roadmap.steps.len(),
            outcome.is_fallback
        );
        Ok(Json(outcome))
    }
    .instrument(span)
    .await
}

/// POST /api/v1/resumes/roadmap
///
/// Roadmap personalized to a parsed resume profile and target position.
pub async fn handle_resume_roadmap(
    State(state): State<AppState>,
    Json(request): Json<ResumeRoadmapRequest>,
) -> Result<Json<RoadmapOutcome>, AppError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("resume_roadmap", %request_id);

    async move {
        info!(
            "Generating resume roadmap for '{}' ({} profile skills)",
            request.target_position,
            request.profile.skills.len()
        );
        let outcome = state
            .roadmaps
            .generate_roadmap_for_resume(
                &request.profile,
                &request.target_position,
                &request.target_requirements,
            )
            .await?;
        Ok(Json(outcome))
    }
    .instrument(span)
    .await
}

/// POST /api/v1/goals/enhance
pub async fn handle_enhance_goal(
    State(state): State<AppState>,
    Json(request): Json<EnhanceGoalRequest>,
) -> Result<Json<EnhancedGoal>, AppError> {
    let enhanced = enhance_goal(state.llm.as_ref(), &request.goal_text).await?;
    Ok(Json(enhanced))
}
