//! Resume analysis orchestration.
//!
//! bytes → text (blocking pool) → `ResumeProfile` → cache lookup → one of:
//! - inferred-positions: no requirements given; positions with gaps and courses
//! - specified-goal: gap analysis, insights, courses and a fallback roadmap preview

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use super::cache::{cache_key, TtlCache};
use super::extract::extract_text;
use super::insights::{generate_gap_insights, GapInsights};
use super::parser::{parse_resume_text, ResumeProfile};
use super::positions::{infer_positions, GapAssessment, PositionAnalysis};
use crate::courses::{CourseAdvisor, CourseRecommendations};
use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::roadmap::fallback::plan_fallback_roadmap;
use crate::roadmap::models::{Roadmap, TargetRequirements};
use crate::roadmap::synthesizer::Provenance;
use crate::skills::{analyze_skill_gap, canonicalize_skills, match_skills_in_text};

const SPECIFIED_GAP_CONFIDENCE: f64 = 0.85;
const DEFAULT_POSITION_TITLE: &str = "Target Role";
pub const ROADMAP_UNAVAILABLE_REASON: &str = "Roadmap generation requires a specified career goal.";

/// Optional target supplied with a resume upload.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub requirements_text: Option<String>,
    pub requirements: Vec<String>,
}

impl AnalysisRequest {
    fn requirements_text(&self) -> &str {
        self.requirements_text.as_deref().map(str::trim).unwrap_or_default()
    }

    fn has_target(&self) -> bool {
        !self.requirements.is_empty() || !self.requirements_text().is_empty()
    }

    /// JSON of the requirement list when non-empty, else the requirements text.
    fn cache_discriminator(&self) -> String {
        if self.requirements.is_empty() {
            self.requirements_text().to_string()
        } else {
            serde_json::to_string(&self.requirements).unwrap_or_default()
        }
    }

    /// Canonicalized requirement list, else skills matched in the text.
    fn target_skills(&self) -> Vec<String> {
        if self.requirements.is_empty() {
            canonicalize_skills(&match_skills_in_text(self.requirements_text()))
        } else {
            canonicalize_skills(&self.requirements)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum AnalysisResult {
    InferredPositions(InferredPositionsAnalysis),
    SpecifiedGoal(SpecifiedGoalAnalysis),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferredPositionsAnalysis {
    pub parsed: ResumeProfile,
    pub positions: Vec<PositionAnalysis>,
    pub ai_meta: Provenance,
    pub ai_roadmap_available: bool,
    pub roadmap_unavailable_reason: String,
    pub roadmap_preview: Option<Roadmap>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecifiedGoalAnalysis {
    pub parsed: ResumeProfile,
    pub target: TargetRequirements,
    pub target_skills: Vec<String>,
    pub skill_gap: GapAssessment,
    pub insights: GapInsights,
    pub recommendations: CourseRecommendations,
    pub ai_roadmap_available: bool,
    pub roadmap_preview: Roadmap,
}

pub struct ResumeAnalyzer {
    generator: Arc<dyn TextGenerator>,
    courses: Arc<CourseAdvisor>,
    cache: TtlCache<AnalysisResult>,
}

impl ResumeAnalyzer {
    pub fn new(generator: Arc<dyn TextGenerator>, courses: Arc<CourseAdvisor>, cache_ttl: Duration) -> Self {
        Self {
            generator,
            courses,
            cache: TtlCache::new(cache_ttl),
        }
    }

    pub async fn analyze_resume(
        &self,
        file: Bytes,
        mime_type: &str,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, AppError> {
        let mime = mime_type.to_string();
        let text = tokio::task::spawn_blocking(move || extract_text(&file, &mime))
            .await
            .map_err(|e| AppError::Internal(anyhow!("Text extraction task failed: {e}")))??;

        let profile = parse_resume_text(&text);
        info!(
            "Parsed resume: {} skills, {} experience lines, {} project lines",
            profile.skills.len(),
            profile.experience.len(),
            profile.projects.len()
        );

        let key = cache_key(&text, &request.cache_discriminator());
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let result = if request.has_target() {
            AnalysisResult::SpecifiedGoal(self.analyze_against_target(profile, request).await)
        } else {
            AnalysisResult::InferredPositions(self.analyze_positions(profile).await)
        };

        self.cache.insert(key, result.clone());
        Ok(result)
    }

    async fn analyze_positions(&self, profile: ResumeProfile) -> InferredPositionsAnalysis {
        let inference = infer_positions(self.generator.as_ref(), &self.courses, &profile).await;
        InferredPositionsAnalysis {
            parsed: profile,
            positions: inference.positions,
            ai_meta: inference.provenance,
            ai_roadmap_available: false,
            roadmap_unavailable_reason: ROADMAP_UNAVAILABLE_REASON.to_string(),
            roadmap_preview: None,
        }
    }

    async fn analyze_against_target(&self, profile: ResumeProfile, request: &AnalysisRequest) -> SpecifiedGoalAnalysis {
        let target_skills = request.target_skills();
        let gap = analyze_skill_gap(&profile.skills, &target_skills);
        let target = TargetRequirements {
            skills: target_skills.clone(),
            description: request.requirements_text().to_string(),
        };

        let insights =
            generate_gap_insights(self.generator.as_ref(), &profile.skills, &target, &gap.missing).await;

        let position_title = match request.requirements_text() {
            "" => DEFAULT_POSITION_TITLE,
            text => text,
        };
        let recommendations = self.courses.recommend_for_position(&gap.missing, position_title);
        let roadmap_preview = plan_fallback_roadmap(&profile.skills, &target_skills, &profile);

        SpecifiedGoalAnalysis {
            parsed: profile,
            target,
            target_skills,
            skill_gap: GapAssessment::new(gap, SPECIFIED_GAP_CONFIDENCE),
            insights,
            recommendations,
            ai_roadmap_available: true,
            roadmap_preview,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::courses::catalog::{CourseCatalog, StaticCourseCatalog};
    use crate::courses::popular::CatalogPopularCourses;
    use crate::llm_client::testing::ScriptedGenerator;
    use crate::llm_client::LlmClient;

    const RESUME: &str = "Jane Doe\njane@example.com | +1 555-123-4567\n\n\
        Summary\n5 years of Python, Django, and PostgreSQL experience.\n\n\
        Experience\nBackend Engineer at Acme\nBuilt Django REST services in Python\n\n\
        Education\nBachelor of Science in Computer Science\n";

    fn analyzer(generator: Arc<dyn TextGenerator>, ttl: Duration) -> ResumeAnalyzer {
        let catalog: Arc<dyn CourseCatalog> = Arc::new(StaticCourseCatalog::bundled());
        let courses = Arc::new(CourseAdvisor::new(
            catalog.clone(),
            Arc::new(CatalogPopularCourses::new(catalog)),
        ));
        ResumeAnalyzer::new(generator, courses, ttl)
    }

    fn target(skills: &[&str]) -> AnalysisRequest {
        AnalysisRequest {
            requirements_text: None,
            requirements: skills.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_specified_goal_end_to_end_without_provider() {
        let result = analyzer(Arc::new(LlmClient::Disabled), Duration::ZERO)
            .analyze_resume(
                Bytes::from_static(RESUME.as_bytes()),
                "text/plain; charset=utf-8",
                &target(&["python", "django", "docker", "kubernetes"]),
            )
            .await
            .unwrap();

        let AnalysisResult::SpecifiedGoal(analysis) = result else {
            panic!("expected specified-goal mode");
        };
        assert_eq!(analysis.skill_gap.gap.matched, vec!["python", "django"]);
        assert_eq!(analysis.skill_gap.gap.missing, vec!["docker", "kubernetes"]);
        assert_eq!(analysis.skill_gap.gap.gap_size, 2);
        assert_eq!(analysis.skill_gap.confidence, 0.5);
        assert_eq!(analysis.insights.insights[0].action, "Learn docker");
        assert_eq!(analysis.roadmap_preview.steps.len(), 4);
        assert_eq!(analysis.parsed.email.as_deref(), Some("jane@example.com"));
        assert!(analysis.parsed.experience.contains(&"Backend Engineer at Acme".to_string()));
    }

    #[tokio::test]
    async fn test_requirements_text_drives_target_skills() {
        let request = AnalysisRequest {
            requirements_text: Some("Backend role: Python, Docker and Kubernetes".to_string()),
            requirements: Vec::new(),
        };
        let result = analyzer(Arc::new(LlmClient::Disabled), Duration::ZERO)
            .analyze_resume(Bytes::from_static(RESUME.as_bytes()), "text/plain", &request)
            .await
            .unwrap();

        let AnalysisResult::SpecifiedGoal(analysis) = result else {
            panic!("expected specified-goal mode");
        };
        assert_eq!(analysis.target_skills, vec!["python", "docker", "kubernetes"]);
        assert_eq!(analysis.target.description, "Backend role: Python, Docker and Kubernetes");
    }

    #[tokio::test]
    async fn test_no_target_infers_positions() {
        let result = analyzer(Arc::new(LlmClient::Disabled), Duration::ZERO)
            .analyze_resume(
                Bytes::from_static(RESUME.as_bytes()),
                "text/plain",
                &AnalysisRequest::default(),
            )
            .await
            .unwrap();

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["mode"], "inferred-positions");
        assert_eq!(value["roadmapUnavailableReason"], ROADMAP_UNAVAILABLE_REASON);
        assert!(value["roadmapPreview"].is_null());
        assert_eq!(value["aiMeta"]["aiService"], "heuristic");
        assert_eq!(value["positions"][0]["title"], "Full Stack Developer");
    }

    #[tokio::test]
    async fn test_identical_requests_hit_the_cache() {
        let generator = Arc::new(ScriptedGenerator::with_responses([
            r#"{"insights": [{"action": "Ship a Dockerized app"}], "confidence": 0.9}"#,
        ]));
        let analyzer = analyzer(generator.clone(), Duration::from_secs(600));
        let request = target(&["python", "docker"]);

        let first = analyzer
            .analyze_resume(Bytes::from_static(RESUME.as_bytes()), "text/plain", &request)
            .await
            .unwrap();
        let second = analyzer
            .analyze_resume(Bytes::from_static(RESUME.as_bytes()), "text/plain", &request)
            .await
            .unwrap();

        assert_eq!(generator.calls(), 1);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_unsupported_and_blank_uploads_are_input_errors() {
        let analyzer = analyzer(Arc::new(LlmClient::Disabled), Duration::ZERO);
        let err = analyzer
            .analyze_resume(Bytes::from_static(b"GIF89a"), "image/gif", &AnalysisRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "INPUT_ERROR");

        let err = analyzer
            .analyze_resume(Bytes::from_static(b"  \n "), "text/plain", &AnalysisRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "INPUT_ERROR");
    }
}
