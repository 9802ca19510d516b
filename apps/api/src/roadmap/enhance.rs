//! Goal enhancement: turns a free-text goal into structured goal fields.
//!
//! There is no deterministic fallback here. Generator failures propagate.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::models::Difficulty;
use super::prompts::{ENHANCE_GOAL_PROMPT_TEMPLATE, ENHANCE_GOAL_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::{generate_json, GenerationRequest, TextGenerator};

pub const MIN_GOAL_TEXT_CHARS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedGoal {
    pub suggested_name: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub estimated_time: String,
    pub description: String,
    pub tags: Vec<String>,
    pub skills_required: Vec<String>,
    pub skills_learned: Vec<String>,
}

/// Loosely-typed generator output before coercion.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawEnhancedGoal {
    suggested_name: String,
    category: String,
    difficulty: String,
    estimated_time: String,
    description: String,
    tags: Vec<String>,
    skills_required: Vec<String>,
    skills_learned: Vec<String>,
}

pub async fn enhance_goal(generator: &dyn TextGenerator, goal_text: &str) -> Result<EnhancedGoal, AppError> {
    let goal_text = goal_text.trim();
    if goal_text.chars().count() < MIN_GOAL_TEXT_CHARS {
        return Err(AppError::Input(format!(
            "Goal text must be at least {MIN_GOAL_TEXT_CHARS} characters"
        )));
    }

    let request = GenerationRequest::json(
        ENHANCE_GOAL_PROMPT_TEMPLATE.replace("{goal_text}", goal_text),
        ENHANCE_GOAL_SYSTEM,
    );
    let (raw, _) = generate_json::<RawEnhancedGoal>(generator, &request)
        .await
        .map_err(|e| {
            warn!("Goal enhancement failed: {e}");
            AppError::GenerationFailed(format!("Failed to enhance goal: {e}"))
        })?;

    if raw.suggested_name.trim().is_empty() {
        return Err(AppError::GenerationFailed(
            "Enhanced goal is missing a name".to_string(),
        ));
    }

    Ok(EnhancedGoal {
        suggested_name: raw.suggested_name.trim().to_string(),
        category: non_empty_or(raw.category, "Other"),
        difficulty: Difficulty::parse_lenient(&raw.difficulty),
        estimated_time: non_empty_or(raw.estimated_time, "3-6 months"),
        description: raw.description.trim().to_string(),
        tags: raw.tags,
        skills_required: raw.skills_required,
        skills_learned: raw.skills_learned,
    })
}

fn non_empty_or(value: String, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}
