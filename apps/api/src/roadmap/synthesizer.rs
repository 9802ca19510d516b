//! Generative Roadmap Synthesizer.
//!
//! Protocol per request:
//! 1. Build a JSON-only system prompt with the roadmap schema and a user prompt
//!    embedding the goal or resume fields.
//! 2. Call the generator. Provider errors propagate immediately.
//! 3. Repair the response (`roadmap::repair`) and validate it. Validation
//!    failures retry, up to MAX_GENERATION_RETRIES + 1 attempts in total.
//! 4. Fewer than six steps: one supplemental steps-only request, no retries.
//!    Its steps replace the originals only when there are at least six.
//! 5. Renumber step orders 1..=n in array order.
//! 6. Attach course suggestions (ranked, or popular fallback).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::models::{GoalData, Roadmap, TargetRequirements, UserContext};
use super::prompts::{
    roadmap_schema, steps_only_schema, GOAL_ROADMAP_PROMPT_TEMPLATE, RESUME_ROADMAP_PROMPT_TEMPLATE,
    RESUME_ROADMAP_SYSTEM, ROADMAP_SYSTEM, STEPS_ONLY_PROMPT_TEMPLATE, STEPS_ONLY_SYSTEM,
};
use super::repair::{parse_steps_response, repair_roadmap_response, RepairOutcome};
use crate::courses::{CourseAdvisor, CourseRecommendations, RankOptions};
use crate::llm_client::prompts::STEPS_FIRST_INSTRUCTION;
use crate::llm_client::{GenerationRequest, LlmError, TextGenerator};
use crate::resume::parser::ResumeProfile;

const MAX_GENERATION_RETRIES: u32 = 2;
/// Roadmaps with fewer steps trigger the supplemental steps-only request.
pub const MIN_COMPLETE_STEPS: usize = 6;
const GOAL_MAX_SUGGESTIONS: usize = 6;
const GOAL_MIN_SCORE: u32 = 25;

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("AI provider failed: {0}")]
    Provider(#[from] LlmError),

    #[error("{reason} after {attempts} attempts")]
    InvalidResponse { attempts: u32, reason: String },
}

/// Which backend produced a roadmap.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub ai_service: String,
    pub ai_model: String,
}

impl Provenance {
    pub fn heuristic() -> Self {
        Self {
            ai_service: "heuristic".to_string(),
            ai_model: "simple-fallback".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizedRoadmap {
    pub roadmap: Roadmap,
    pub course_suggestions: CourseRecommendations,
    #[serde(flatten)]
    pub provenance: Provenance,
    pub generated_at: DateTime<Utc>,
}

/// Prompts for one synthesis run.
struct SynthesisPlan {
    request: GenerationRequest,
    steps_request: GenerationRequest,
    course_options: RankOptions,
}

pub struct RoadmapSynthesizer {
    generator: Arc<dyn TextGenerator>,
    courses: Arc<CourseAdvisor>,
}

impl RoadmapSynthesizer {
    pub fn new(generator: Arc<dyn TextGenerator>, courses: Arc<CourseAdvisor>) -> Self {
        Self { generator, courses }
    }

    pub fn is_available(&self) -> bool {
        self.generator.is_configured()
    }

    /// Roadmap for a user goal.
    pub async fn synthesize_roadmap(
        &self,
        goal: &GoalData,
        context: &UserContext,
    ) -> Result<SynthesizedRoadmap, SynthesisError> {
        let prompt = GOAL_ROADMAP_PROMPT_TEMPLATE.replace("{goal_details}", &goal_details(goal, context));

        let mut subject = format!("goal \"{}\" ({}", goal.name, goal.category);
        if let Some(difficulty) = goal.difficulty.as_deref() {
            subject.push_str(&format!(", {difficulty}"));
        }
        if let Some(time) = goal.estimated_time.as_deref() {
            subject.push_str(&format!(", {time}"));
        }
        subject.push(')');

        self.run(SynthesisPlan {
            request: roadmap_request(prompt, ROADMAP_SYSTEM),
            steps_request: steps_request(&subject),
            course_options: goal_course_options(goal),
        })
        .await
    }

    /// Roadmap personalized to a parsed resume and a target position.
    pub async fn synthesize_resume_roadmap(
        &self,
        profile: &ResumeProfile,
        target_position: &str,
        requirements: &TargetRequirements,
    ) -> Result<SynthesizedRoadmap, SynthesisError> {
        let prompt = RESUME_ROADMAP_PROMPT_TEMPLATE
            .replace("{skills_json}", &to_json(&profile.skills))
            .replace("{education_json}", &to_json(&profile.education))
            .replace("{experience_json}", &to_json(&profile.experience))
            .replace("{projects_json}", &to_json(&profile.projects))
            .replace("{target_position}", target_position)
            .replace("{requirements_json}", &to_json(requirements));

        let subject = format!("target position \"{target_position}\"");
        self.run(SynthesisPlan {
            request: roadmap_request(prompt, RESUME_ROADMAP_SYSTEM),
            steps_request: steps_request(&subject),
            course_options: resume_course_options(target_position, requirements),
        })
        .await
    }

    async fn run(&self, plan: SynthesisPlan) -> Result<SynthesizedRoadmap, SynthesisError> {
        let mut last_reason = String::new();

        for attempt in 0..=MAX_GENERATION_RETRIES {
            let generation = self.generator.generate(&plan.request).await?;

            let (mut roadmap, outcome) = match repair_roadmap_response(&generation.text) {
                Ok(repaired) => repaired,
                Err(reason) => {
                    warn!(
                        "Roadmap attempt {}/{} rejected: {}, retrying",
                        attempt + 1,
                        MAX_GENERATION_RETRIES + 1,
                        reason
                    );
                    last_reason = reason;
                    continue;
                }
            };
            if outcome == RepairOutcome::Reconstructed {
                info!("Roadmap reconstructed from incomplete response");
            }

            if roadmap.steps.len() < MIN_COMPLETE_STEPS {
                self.supplement_steps(&mut roadmap, &plan.steps_request).await;
            }
            roadmap.reindex_steps();

            let course_suggestions = self
                .courses
                .suggest_for_roadmap(&roadmap, &plan.course_options)
                .await;

            return Ok(SynthesizedRoadmap {
                roadmap,
                course_suggestions,
                provenance: Provenance {
                    ai_service: generation.provider,
                    ai_model: generation.model,
                },
                generated_at: Utc::now(),
            });
        }

        Err(SynthesisError::InvalidResponse {
            attempts: MAX_GENERATION_RETRIES + 1,
            reason: last_reason,
        })
    }

    /// One steps-only request. Any failure keeps the original steps.
    async fn supplement_steps(&self, roadmap: &mut Roadmap, request: &GenerationRequest) {
        warn!(
            "Roadmap has only {} steps; requesting steps-only completion",
            roadmap.steps.len()
        );

        let generation = match self.generator.generate(request).await {
            Ok(generation) => generation,
            Err(e) => {
                warn!("Steps-only request failed: {e}; keeping original steps");
                return;
            }
        };

        match parse_steps_response(&generation.text) {
            Some(steps) if steps.len() >= MIN_COMPLETE_STEPS => {
                debug!("Steps-only completion returned {} steps", steps.len());
                roadmap.steps = steps;
            }
            Some(steps) => warn!(
                "Steps-only completion returned {} steps; keeping original steps",
                steps.len()
            ),
            None => warn!("Failed to parse steps-only completion; keeping original steps"),
        }
    }
}

/// Course options for goal roadmaps: goal category, tags and skills.
pub fn goal_course_options(goal: &GoalData) -> RankOptions {
    RankOptions {
        max_suggestions: GOAL_MAX_SUGGESTIONS,
        min_score: GOAL_MIN_SCORE,
        goal_category: Some(goal.category.clone()).filter(|c| !c.trim().is_empty()),
        extra_keywords: goal
            .tags
            .iter()
            .chain(&goal.skills_required)
            .chain(&goal.skills_learned)
            .cloned()
            .collect(),
    }
}

pub fn resume_course_options(target_position: &str, requirements: &TargetRequirements) -> RankOptions {
    RankOptions {
        goal_category: Some(target_position.to_string()).filter(|p| !p.trim().is_empty()),
        extra_keywords: requirements.skills.clone(),
        ..RankOptions::default()
    }
}

fn roadmap_request(prompt: String, system: &str) -> GenerationRequest {
    GenerationRequest::json(prompt, format!("{system}\n\n{STEPS_FIRST_INSTRUCTION}"))
        .with_schema(roadmap_schema())
}

fn steps_request(subject: &str) -> GenerationRequest {
    GenerationRequest::json(STEPS_ONLY_PROMPT_TEMPLATE.replace("{subject}", subject), STEPS_ONLY_SYSTEM)
        .with_schema(steps_only_schema())
}

fn goal_details(goal: &GoalData, context: &UserContext) -> String {
    let mut lines = vec![
        format!("Goal Name: {}", goal.name),
        format!("Description: {}", goal.description),
        format!("Category: {}", goal.category),
    ];
    let optional = [
        ("Difficulty Level", goal.difficulty.as_deref()),
        ("Estimated Time", goal.estimated_time.as_deref()),
        ("User's Current Skill Level", context.skill_level.as_deref()),
        ("User's Background", context.background.as_deref()),
        ("Time Availability", context.time_availability.as_deref()),
    ];
    lines.extend(
        optional
            .into_iter()
            .filter_map(|(label, value)| value.map(|v| format!("{label}: {v}"))),
    );
    lines.join("\n")
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::courses::catalog::{CourseCatalog, StaticCourseCatalog};
    use crate::courses::popular::CatalogPopularCourses;
    use crate::llm_client::testing::ScriptedGenerator;
    use crate::roadmap::models::Difficulty;
    use serde_json::json;

    const LISTING: &str = "web_course = [\n['React Crash Course', 'https://a'],\n['Django Bootcamp', 'https://b'],\n]\n";

    fn synthesizer(generator: Arc<ScriptedGenerator>) -> RoadmapSynthesizer {
        let catalog: Arc<dyn CourseCatalog> = Arc::new(StaticCourseCatalog::from_listing(LISTING));
        let courses = Arc::new(CourseAdvisor::new(
            catalog.clone(),
            Arc::new(CatalogPopularCourses::new(catalog)),
        ));
        RoadmapSynthesizer::new(generator, courses)
    }

    fn goal() -> GoalData {
        GoalData {
            name: "Become a React developer".to_string(),
            description: "Ship production React apps".to_string(),
            category: "Web Development".to_string(),
            difficulty: Some("beginner".to_string()),
            tags: vec!["react".to_string()],
            ..GoalData::default()
        }
    }

    fn roadmap_json(step_count: usize) -> String {
        let steps: Vec<_> = (0..step_count)
            .map(|i| json!({"title": format!("Step {i}"), "description": "d", "duration": "1 week", "skills": ["react"], "order": 10 - i}))
            .collect();
        json!({
            "title": "React Path",
            "description": "Learn React",
            "estimatedDuration": "3 months",
            "difficulty": "Intermediate",
            "steps": steps
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_complete_roadmap_is_reindexed_and_gets_courses() {
        let generator = Arc::new(ScriptedGenerator::with_responses([roadmap_json(6)]));
        let result = synthesizer(generator.clone())
            .synthesize_roadmap(&goal(), &UserContext::default())
            .await
            .unwrap();

        assert_eq!(generator.calls(), 1);
        let orders: Vec<_> = result.roadmap.steps.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(result.roadmap.difficulty, Difficulty::Intermediate);
        assert_eq!(result.provenance.ai_service, "scripted");
        // "React Crash Course" only scores 10, below the goal min score of 25.
        assert!(result.course_suggestions.fallback);
        assert!(!result.course_suggestions.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_request_carries_schema_and_goal_fields() {
        let generator = Arc::new(ScriptedGenerator::with_responses([roadmap_json(6)]));
        synthesizer(generator.clone())
            .synthesize_roadmap(&goal(), &UserContext::default())
            .await
            .unwrap();

        let request = &generator.requests()[0];
        assert!(request.prompt.contains("Goal Name: Become a React developer"));
        assert!(request.prompt.contains("Difficulty Level: beginner"));
        assert!(!request.prompt.contains("Time Availability"));
        assert!(request.schema.is_some());
        assert!(request.system.contains(STEPS_FIRST_INSTRUCTION));
    }

    #[tokio::test]
    async fn test_invalid_responses_retry_then_fail() {
        let generator = Arc::new(ScriptedGenerator::with_responses([
            r#"{"title": "No steps"}"#,
            r#"{"steps": [{"title": "No title"}]}"#,
            r#"{"title": "", "steps": []}"#,
        ]));
        let err = synthesizer(generator.clone())
            .synthesize_roadmap(&goal(), &UserContext::default())
            .await
            .unwrap_err();

        assert_eq!(generator.calls(), 3);
        assert!(matches!(err, SynthesisError::InvalidResponse { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn test_retry_recovers_on_second_attempt() {
        let generator = Arc::new(ScriptedGenerator::with_responses([
            r#"{"title": "No steps"}"#.to_string(),
            roadmap_json(7),
        ]));
        let result = synthesizer(generator.clone())
            .synthesize_roadmap(&goal(), &UserContext::default())
            .await
            .unwrap();
        assert_eq!(generator.calls(), 2);
        assert_eq!(result.roadmap.steps.len(), 7);
    }

    #[tokio::test]
    async fn test_provider_error_is_not_retried() {
        let generator = Arc::new(ScriptedGenerator::new());
        generator.push_error(LlmError::Api {
            status: 429,
            message: "quota exceeded".to_string(),
        });
        let err = synthesizer(generator.clone())
            .synthesize_roadmap(&goal(), &UserContext::default())
            .await
            .unwrap_err();

        assert_eq!(generator.calls(), 1);
        assert!(matches!(err, SynthesisError::Provider(LlmError::Api { status: 429, .. })));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_short_roadmap_is_supplemented() {
        let generator = Arc::new(ScriptedGenerator::with_responses([roadmap_json(2), {
            let steps: Vec<_> = (0..6).map(|i| json!({"title": format!("Full {i}")})).collect();
            json!({ "steps": steps }).to_string()
        }]));
        let result = synthesizer(generator.clone())
            .synthesize_roadmap(&goal(), &UserContext::default())
            .await
            .unwrap();

        assert_eq!(generator.calls(), 2);
        assert_eq!(result.roadmap.steps.len(), 6);
        assert_eq!(result.roadmap.steps[0].title, "Full 0");
        assert_eq!(result.roadmap.steps[5].order, 6);
        assert!(generator.requests()[1].system.contains("at least 6 items"));
    }

    #[tokio::test]
    async fn test_failed_supplement_keeps_original_steps() {
        let generator = Arc::new(ScriptedGenerator::with_responses([
            roadmap_json(3),
            r#"{"steps": [{"title": "only one"}]}"#.to_string(),
        ]));
        let result = synthesizer(generator.clone())
            .synthesize_roadmap(&goal(), &UserContext::default())
            .await
            .unwrap();
        assert_eq!(result.roadmap.steps.len(), 3);
        assert_eq!(result.roadmap.steps[0].title, "Step 0");

        // Script exhausted: the supplemental call itself fails.
        let generator = Arc::new(ScriptedGenerator::with_responses([roadmap_json(2)]));
        let result = synthesizer(generator)
            .synthesize_roadmap(&goal(), &UserContext::default())
            .await
            .unwrap();
        assert_eq!(result.roadmap.steps.len(), 2);
    }

    #[tokio::test]
    async fn test_truncated_response_never_errors() {
        let generator = Arc::new(ScriptedGenerator::with_responses([
            r#"{"title":"X","steps":[{"title":"A""#,
        ]));
        let result = synthesizer(generator)
            .synthesize_roadmap(&goal(), &UserContext::default())
            .await
            .unwrap();
        assert_eq!(result.roadmap.title, "X");
        assert_eq!(result.roadmap.steps[0].title, "Step 1: Foundation");
        assert_eq!(result.roadmap.steps[0].order, 1);
    }

    #[tokio::test]
    async fn test_resume_roadmap_embeds_profile() {
        let generator = Arc::new(ScriptedGenerator::with_responses([roadmap_json(6)]));
        let profile = ResumeProfile {
            skills: vec!["python".to_string()],
            ..ResumeProfile::default()
        };
        let requirements = TargetRequirements {
            skills: vec!["docker".to_string()],
            description: String::new(),
        };
        synthesizer(generator.clone())
            .synthesize_resume_roadmap(&profile, "Backend Developer", &requirements)
            .await
            .unwrap();

        let request = &generator.requests()[0];
        assert!(request.prompt.contains(r#"Skills: ["python"]"#));
        assert!(request.prompt.contains("Target position: Backend Developer"));
        assert!(request.prompt.contains(r#""skills":["docker"]"#));
    }
}
