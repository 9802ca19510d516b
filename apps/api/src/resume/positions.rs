//! Position inference for resumes analyzed without a target.
//!
//! The generator proposes up to three positions. Any generator or parse
//! failure falls back to an ordered rule table over the resume's skills.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::parser::ResumeProfile;
use super::prompts::{POSITIONS_PROMPT_TEMPLATE, POSITIONS_SYSTEM};
use crate::courses::{CourseAdvisor, CourseRecommendations};
use crate::llm_client::{generate_json, GenerationRequest, LlmError, TextGenerator};
use crate::roadmap::synthesizer::Provenance;
use crate::skills::{analyze_skill_gap, SkillGapResult};

pub const MAX_POSITIONS: usize = 3;
const AI_POSITION_CONFIDENCE: f64 = 0.7;
const AI_GAP_CONFIDENCE: f64 = 0.8;
const HEURISTIC_POSITION_CONFIDENCE: f64 = 0.6;
const HEURISTIC_GAP_CONFIDENCE: f64 = 0.75;
const HEURISTIC_RATIONALE: &str = "Inferred from resume skills without AI service";
const HEURISTIC_EXPERIENCE_RANGE: &str = "1-3 years";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypicalRequirements {
    pub skills: Vec<String>,
    pub tools: Vec<String>,
    pub experience_years_range: String,
    pub education: String,
    pub certifications: Vec<String>,
}

/// Gap analysis with its presentation confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapAssessment {
    #[serde(flatten)]
    pub gap: SkillGapResult,
    pub confidence: f64,
}

impl GapAssessment {
    pub fn new(gap: SkillGapResult, default_confidence: f64) -> Self {
        let confidence = gap.confidence_or(default_confidence);
        Self { gap, confidence }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionAnalysis {
    pub title: String,
    pub confidence: f64,
    pub rationale: String,
    pub typical_requirements: TypicalRequirements,
    pub skill_gap: GapAssessment,
    pub recommendations: CourseRecommendations,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionInference {
    pub positions: Vec<PositionAnalysis>,
    #[serde(flatten)]
    pub provenance: Provenance,
}

#[derive(Debug, Deserialize)]
struct PositionsPayload {
    positions: Vec<SuggestedPosition>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SuggestedPosition {
    title: String,
    typical_requirements: TypicalRequirements,
    confidence: Option<f64>,
    rationale: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Heuristic rule table
// ────────────────────────────────────────────────────────────────────────────

struct PositionRule {
    title: &'static str,
    triggers: &'static [&'static str],
    requirements: &'static [&'static str],
}

/// Evaluated in order. Every matching rule yields a position.
const POSITION_RULES: &[PositionRule] = &[
    PositionRule {
        title: "Frontend Developer",
        triggers: &["react", "html", "css", "frontend"],
        requirements: &["react", "javascript", "html", "css", "testing"],
    },
    PositionRule {
        title: "Backend Developer",
        triggers: &["node", "express", "backend"],
        requirements: &["node", "express", "sql", "mongodb", "rest"],
    },
    PositionRule {
        title: "Android Developer",
        triggers: &["android", "kotlin", "flutter"],
        requirements: &["android", "kotlin", "java", "git"],
    },
    PositionRule {
        title: "iOS Developer",
        triggers: &["ios", "swift"],
        requirements: &["ios", "swift", "xcode", "git"],
    },
    PositionRule {
        title: "Machine Learning Engineer",
        triggers: &["tensorflow", "pytorch", "sklearn", "machine", "data"],
        requirements: &["python", "numpy", "pandas", "tensorflow", "pytorch"],
    },
];

const DEFAULT_POSITION: PositionRule = PositionRule {
    title: "Full Stack Developer",
    triggers: &[],
    requirements: &["react", "node", "javascript", "sql"],
};

/// Titles and requirement lists from the rule table, at most three.
pub fn heuristic_positions(skills: &[String]) -> Vec<(&'static str, Vec<String>)> {
    let has = |skill: &&str| skills.iter().any(|s| s.eq_ignore_ascii_case(skill));
    let mut matched: Vec<&PositionRule> = POSITION_RULES
        .iter()
        .filter(|rule| rule.triggers.iter().any(has))
        .collect();
    if matched.is_empty() {
        matched.push(&DEFAULT_POSITION);
    }

    matched
        .into_iter()
        .take(MAX_POSITIONS)
        .map(|rule| {
            (
                rule.title,
                rule.requirements.iter().map(|s| s.to_string()).collect(),
            )
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Inference
// ────────────────────────────────────────────────────────────────────────────

/// Generator-backed inference. Fails when the response has no `positions` array.
async fn suggest_positions(
    generator: &dyn TextGenerator,
    profile: &ResumeProfile,
) -> Result<(Vec<SuggestedPosition>, Provenance), LlmError> {
    let to_json = |list: &[String]| serde_json::to_string(list).unwrap_or_else(|_| "[]".to_string());
    let prompt = POSITIONS_PROMPT_TEMPLATE
        .replace("{skills_json}", &to_json(&profile.skills))
        .replace("{education_json}", &to_json(&profile.education))
        .replace("{experience_json}", &to_json(&profile.experience))
        .replace("{projects_json}", &to_json(&profile.projects));

    let request = GenerationRequest::json(prompt, POSITIONS_SYSTEM);
    let (payload, generation) = generate_json::<PositionsPayload>(generator, &request).await?;
    Ok((
        payload.positions,
        Provenance {
            ai_service: generation.provider,
            ai_model: generation.model,
        },
    ))
}

/// Top positions for a resume with gap analysis and course recommendations each.
pub async fn infer_positions(
    generator: &dyn TextGenerator,
    courses: &CourseAdvisor,
    profile: &ResumeProfile,
) -> PositionInference {
    let analyze = |title: &str, requirements: &[String]| {
        let gap = analyze_skill_gap(&profile.skills, requirements);
        let recommendations = courses.recommend_for_position(&gap.missing, title);
        (gap, recommendations)
    };

    match suggest_positions(generator, profile).await {
        Ok((suggested, provenance)) => {
            let positions = suggested
                .into_iter()
                .take(MAX_POSITIONS)
                .map(|position| {
                    let requirements: Vec<String> = position
                        .typical_requirements
                        .skills
                        .iter()
                        .map(|s| s.to_lowercase())
                        .collect();
                    let (gap, recommendations) = analyze(&position.title, &requirements);
                    PositionAnalysis {
                        confidence: position.confidence.unwrap_or(AI_POSITION_CONFIDENCE),
                        skill_gap: GapAssessment::new(gap, AI_GAP_CONFIDENCE),
                        title: position.title,
                        rationale: position.rationale,
                        typical_requirements: position.typical_requirements,
                        recommendations,
                    }
                })
                .collect();
            PositionInference {
                positions,
                provenance,
            }
        }
        Err(e) => {
            warn!("Position inference failed ({e}); using heuristic positions");
            let positions = heuristic_positions(&profile.skills)
                .into_iter()
                .map(|(title, requirements)| {
                    let (gap, recommendations) = analyze(title, &requirements);
                    PositionAnalysis {
                        title: title.to_string(),
                        confidence: HEURISTIC_POSITION_CONFIDENCE,
                        rationale: HEURISTIC_RATIONALE.to_string(),
                        typical_requirements: TypicalRequirements {
                            skills: requirements,
                            experience_years_range: HEURISTIC_EXPERIENCE_RANGE.to_string(),
                            ..TypicalRequirements::default()
                        },
                        skill_gap: GapAssessment::new(gap, HEURISTIC_GAP_CONFIDENCE),
                        recommendations,
                    }
                })
                .collect();
            PositionInference {
                positions,
                provenance: Provenance::heuristic(),
            }
        }
    }
}
