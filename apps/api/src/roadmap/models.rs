use serde::{Deserialize, Serialize};

/// Overall roadmap difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    /// Coerces free text ("Intermediate", "beginner/intermediate", "expert")
    /// to a level. The earliest recognised word wins; unknown text is beginner.
    pub fn parse_lenient(raw: &str) -> Difficulty {
        const WORDS: &[(&str, Difficulty)] = &[
            ("beginner", Difficulty::Beginner),
            ("basic", Difficulty::Beginner),
            ("easy", Difficulty::Beginner),
            ("novice", Difficulty::Beginner),
            ("intermediate", Difficulty::Intermediate),
            ("medium", Difficulty::Intermediate),
            ("advanced", Difficulty::Advanced),
            ("expert", Difficulty::Advanced),
            ("hard", Difficulty::Advanced),
        ];

        let lowered = raw.to_lowercase();
        WORDS
            .iter()
            .filter_map(|(word, level)| lowered.find(word).map(|pos| (pos, *level)))
            .min_by_key(|(pos, _)| *pos)
            .map(|(_, level)| level)
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapStep {
    pub title: String,
    pub description: String,
    /// Free text such as "2 weeks".
    pub duration: String,
    pub skills: Vec<String>,
    /// 1-based and contiguous once normalized.
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roadmap {
    pub title: String,
    pub description: String,
    pub estimated_duration: String,
    pub difficulty: Difficulty,
    pub steps: Vec<RoadmapStep>,
    #[serde(default)]
    pub skills_required: Vec<String>,
    #[serde(default)]
    pub skills_learned: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personalization_score: Option<f64>,
}

impl Roadmap {
    /// Renumbers steps 1..=n in array order.
    pub fn reindex_steps(&mut self) {
        for (index, step) in self.steps.iter_mut().enumerate() {
            step.order = index as u32 + 1;
        }
    }
}

/// A user goal as submitted for roadmap generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoalData {
    pub name: String,
    pub description: String,
    pub category: String,
    pub difficulty: Option<String>,
    pub estimated_time: Option<String>,
    pub tags: Vec<String>,
    pub skills_required: Vec<String>,
    pub skills_learned: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserContext {
    pub skill_level: Option<String>,
    pub background: Option<String>,
    pub time_availability: Option<String>,
}

/// Target role requirements for resume-driven roadmaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TargetRequirements {
    pub skills: Vec<String>,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient_difficulty() {
        assert_eq!(Difficulty::parse_lenient("Intermediate"), Difficulty::Intermediate);
        assert_eq!(
            Difficulty::parse_lenient("beginner/intermediate"),
            Difficulty::Beginner
        );
        assert_eq!(Difficulty::parse_lenient("Expert level"), Difficulty::Advanced);
        assert_eq!(Difficulty::parse_lenient("???"), Difficulty::Beginner);
    }

    #[test]
    fn test_reindex_preserves_array_order() {
        let step = |title: &str, order: u32| RoadmapStep {
            title: title.to_string(),
            description: String::new(),
            duration: "1 week".to_string(),
            skills: vec![],
            order,
        };
        let mut roadmap = Roadmap {
            title: "R".to_string(),
            description: String::new(),
            estimated_duration: "3-6 months".to_string(),
            difficulty: Difficulty::Beginner,
            steps: vec![step("a", 5), step("b", 2), step("c", 2)],
            skills_required: vec![],
            skills_learned: vec![],
            tags: vec![],
            confidence: None,
            personalization_score: None,
        };
        roadmap.reindex_steps();
        let titles: Vec<_> = roadmap.steps.iter().map(|s| s.title.as_str()).collect();
        let orders: Vec<_> = roadmap.steps.iter().map(|s| s.order).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn test_roadmap_serializes_camel_case() {
        let json = serde_json::json!({
            "title": "T",
            "description": "D",
            "estimatedDuration": "4-8 weeks",
            "difficulty": "advanced",
            "steps": []
        });
        let roadmap: Roadmap = serde_json::from_value(json).unwrap();
        assert_eq!(roadmap.difficulty, Difficulty::Advanced);
        assert!(roadmap.tags.is_empty());
        let back = serde_json::to_value(&roadmap).unwrap();
        assert_eq!(back["estimatedDuration"], "4-8 weeks");
        assert!(back.get("confidence").is_none());
    }
}
