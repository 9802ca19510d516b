//! Gap insights: actionable tips for closing a skill gap.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::prompts::{INSIGHTS_PROMPT_TEMPLATE, INSIGHTS_SYSTEM};
use crate::llm_client::{generate_json, GenerationRequest, TextGenerator};
use crate::roadmap::models::TargetRequirements;
use crate::roadmap::synthesizer::Provenance;

const AI_INSIGHTS_CONFIDENCE: f64 = 0.7;
const HEURISTIC_INSIGHTS_CONFIDENCE: f64 = 0.5;
const MAX_HEURISTIC_TIPS: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Insight {
    pub action: String,
    pub why: String,
    pub resources: Vec<String>,
    pub timeline: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapInsights {
    pub insights: Vec<Insight>,
    pub confidence: f64,
    #[serde(flatten)]
    pub provenance: Provenance,
}

#[derive(Debug, Deserialize)]
struct InsightsPayload {
    insights: Vec<Insight>,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Generator insights, or one "Learn <skill>" tip per missing skill when the
/// generator is unavailable, its response is unusable, or it returns no
/// insights while skills are missing.
pub async fn generate_gap_insights(
    generator: &dyn TextGenerator,
    current_skills: &[String],
    requirements: &TargetRequirements,
    missing: &[String],
) -> GapInsights {
    let prompt = INSIGHTS_PROMPT_TEMPLATE
        .replace(
            "{current_skills_json}",
            &serde_json::to_string(current_skills).unwrap_or_else(|_| "[]".to_string()),
        )
        .replace(
            "{requirements_json}",
            &serde_json::to_string(requirements).unwrap_or_else(|_| "{}".to_string()),
        );
    let request = GenerationRequest::json(prompt, INSIGHTS_SYSTEM);

    match generate_json::<InsightsPayload>(generator, &request).await {
        Ok((payload, _)) if payload.insights.is_empty() && !missing.is_empty() => {
            warn!("Generator returned no gap insights; using heuristic tips");
            heuristic_insights(missing)
        }
        Ok((payload, generation)) => GapInsights {
            insights: payload.insights,
            confidence: payload.confidence.unwrap_or(AI_INSIGHTS_CONFIDENCE),
            provenance: Provenance {
                ai_service: generation.provider,
                ai_model: generation.model,
            },
        },
        Err(e) => {
            warn!("Gap insights generation failed ({e}); using heuristic tips");
            heuristic_insights(missing)
        }
    }
}

pub fn heuristic_insights(missing: &[String]) -> GapInsights {
    let insights = missing
        .iter()
        .take(MAX_HEURISTIC_TIPS)
        .map(|skill| Insight {
            action: format!("Learn {skill}"),
            why: "Required for your target role and currently missing from your skill set."
                .to_string(),
            resources: vec![format!("Search: {skill} course"), format!("Documentation: {skill}")],
            timeline: "1-2 weeks per skill with practice".to_string(),
        })
        .collect();

    GapInsights {
        insights,
        confidence: HEURISTIC_INSIGHTS_CONFIDENCE,
        provenance: Provenance::heuristic(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedGenerator;
    use crate::llm_client::LlmClient;

    fn requirements() -> TargetRequirements {
        TargetRequirements {
            skills: vec!["docker".to_string()],
            description: "Platform engineer".to_string(),
        }
    }

    #[test]
    fn test_heuristic_tips_are_capped() {
        let missing: Vec<String> = (0..9).map(|i| format!("skill{i}")).collect();
        let insights = heuristic_insights(&missing);
        assert_eq!(insights.insights.len(), 6);
        assert_eq!(insights.insights[0].action, "Learn skill0");
        assert_eq!(insights.insights[0].resources[1], "Documentation: skill0");
        assert_eq!(insights.confidence, 0.5);
        assert_eq!(insights.provenance.ai_model, "simple-fallback");
    }

    #[tokio::test]
    async fn test_generator_insights_default_confidence() {
        let generator = ScriptedGenerator::with_responses([
            r#"{"insights": [{"action": "Containerize a service", "why": "Docker is required"}]}"#,
        ]);
        let insights =
            generate_gap_insights(&generator, &["python".to_string()], &requirements(), &[]).await;
        assert_eq!(insights.insights.len(), 1);
        assert!(insights.insights[0].resources.is_empty());
        assert_eq!(insights.confidence, 0.7);
        assert_eq!(insights.provenance.ai_service, "scripted");
        assert!(generator.requests()[0].prompt.contains(r#"Current skills: ["python"]"#));
    }

    #[tokio::test]
    async fn test_empty_generator_insights_fall_back_when_skills_missing() {
        let generator = ScriptedGenerator::with_responses([
            r#"{"insights": [], "confidence": 0.9}"#,
            r#"{"insights": []}"#,
        ]);

        let insights =
            generate_gap_insights(&generator, &[], &requirements(), &["docker".to_string()]).await;
        assert_eq!(insights.insights.len(), 1);
        assert_eq!(insights.insights[0].action, "Learn docker");
        assert_eq!(insights.confidence, 0.5);
        assert_eq!(insights.provenance, Provenance::heuristic());

        let nothing_missing = generate_gap_insights(&generator, &[], &requirements(), &[]).await;
        assert!(nothing_missing.insights.is_empty());
        assert_eq!(nothing_missing.provenance.ai_service, "scripted");
    }

    #[tokio::test]
    async fn test_disabled_generator_falls_back() {
        let insights = generate_gap_insights(
            &LlmClient::Disabled,
            &[],
            &requirements(),
            &["docker".to_string()],
        )
        .await;
        assert_eq!(insights.insights[0].action, "Learn docker");
        assert_eq!(insights.provenance, Provenance::heuristic());
    }
}
