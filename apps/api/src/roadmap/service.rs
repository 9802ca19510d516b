//! Roadmap service: the synthesizer with the mandatory fallback wired in.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::fallback::plan_fallback_roadmap;
use super::models::{GoalData, Roadmap, TargetRequirements, UserContext};
use super::synthesizer::{
    goal_course_options, resume_course_options, Provenance, RoadmapSynthesizer, SynthesisError,
    SynthesizedRoadmap,
};
use crate::courses::{CourseAdvisor, RankOptions};
use crate::errors::AppError;
use crate::llm_client::LlmError;
use crate::resume::parser::ResumeProfile;
use crate::skills::{analyze_skill_gap, SkillGapResult};

const FALLBACK_CONFIDENCE: f64 = 0.5;
const FALLBACK_PERSONALIZATION: f64 = 0.5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapOutcome {
    #[serde(flatten)]
    pub roadmap: SynthesizedRoadmap,
    /// True when the Fallback Planner produced the roadmap.
    pub is_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills_analysis: Option<SkillGapResult>,
}

pub struct RoadmapService {
    synthesizer: RoadmapSynthesizer,
    courses: Arc<CourseAdvisor>,
}

impl RoadmapService {
    pub fn new(synthesizer: RoadmapSynthesizer, courses: Arc<CourseAdvisor>) -> Self {
        Self { synthesizer, courses }
    }

    /// Goal roadmap. Falls back to the planner only when the goal carries
    /// skills; otherwise generation failure propagates.
    pub async fn generate_roadmap_for_goal(
        &self,
        goal: &GoalData,
        context: &UserContext,
    ) -> Result<RoadmapOutcome, AppError> {
        if goal.name.trim().is_empty() {
            return Err(AppError::Input("Goal name is required".to_string()));
        }

        let error = match self.attempt(self.synthesizer.synthesize_roadmap(goal, context)).await {
            Ok(roadmap) => {
                return Ok(RoadmapOutcome {
                    roadmap,
                    is_fallback: false,
                    skills_analysis: None,
                })
            }
            Err(e) => e,
        };

        if goal.skills_required.is_empty() && goal.skills_learned.is_empty() {
            return Err(error.into());
        }

        warn!("Goal roadmap generation failed ({error}); using fallback planner");
        let mut roadmap = plan_fallback_roadmap(
            &goal.skills_required,
            &goal.skills_learned,
            &ResumeProfile::default(),
        );
        roadmap.title = format!("{} Roadmap (Fallback)", goal.name.trim());
        if !goal.description.trim().is_empty() {
            roadmap.description = goal.description.trim().to_string();
        }

        Ok(RoadmapOutcome {
            roadmap: self.fallback(roadmap, &goal_course_options(goal)).await,
            is_fallback: true,
            skills_analysis: None,
        })
    }

    /// Resume roadmap. Never fails once the inputs are valid.
    pub async fn generate_roadmap_for_resume(
        &self,
        profile: &ResumeProfile,
        target_position: &str,
        requirements: &TargetRequirements,
    ) -> Result<RoadmapOutcome, AppError> {
        if profile.skills.is_empty() {
            return Err(AppError::Input(
                "Resume profile has no skills to build a roadmap from".to_string(),
            ));
        }
        let target_position = target_position.trim();
        if target_position.is_empty() && requirements.skills.is_empty() {
            return Err(AppError::Input(
                "A target position or target skills are required".to_string(),
            ));
        }

        let skills_analysis = analyze_skill_gap(&profile.skills, &requirements.skills);

        let synthesized = self
            .attempt(
                self.synthesizer
                    .synthesize_resume_roadmap(profile, target_position, requirements),
            )
            .await;

        let (roadmap, is_fallback) = match synthesized {
            Ok(roadmap) => (roadmap, false),
            Err(e) => {
                warn!("Resume roadmap generation failed ({e}); using fallback planner");
                let mut roadmap = plan_fallback_roadmap(&profile.skills, &requirements.skills, profile);
                let position = if target_position.is_empty() {
                    "Target Role"
                } else {
                    target_position
                };
                roadmap.title = format!("{position} Roadmap (Fallback)");
                roadmap.confidence = Some(FALLBACK_CONFIDENCE);
                roadmap.personalization_score = Some(FALLBACK_PERSONALIZATION);
                let options = resume_course_options(target_position, requirements);
                (self.fallback(roadmap, &options).await, true)
            }
        };

        Ok(RoadmapOutcome {
            roadmap,
            is_fallback,
            skills_analysis: Some(skills_analysis),
        })
    }

    /// Skips the generator entirely when it is not configured.
    async fn attempt<F>(&self, synthesis: F) -> Result<SynthesizedRoadmap, SynthesisError>
    where
        F: std::future::Future<Output = Result<SynthesizedRoadmap, SynthesisError>>,
    {
        if !self.synthesizer.is_available() {
            info!("Text generator not configured; skipping synthesis");
            return Err(SynthesisError::Provider(LlmError::NotConfigured));
        }
        synthesis.await
    }

    async fn fallback(&self, roadmap: Roadmap, options: &RankOptions) -> SynthesizedRoadmap {
        let course_suggestions = self.courses.suggest_for_roadmap(&roadmap, options).await;
        SynthesizedRoadmap {
            roadmap,
            course_suggestions,
            provenance: Provenance::heuristic(),
            generated_at: Utc::now(),
        }
    }
}
