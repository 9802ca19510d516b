//! Deterministic Fallback Planner.
//!
//! Pure and offline: builds a fixed four-step roadmap from the skill gap and
//! the resume's experience and project lines. Used whenever generation fails
//! or the provider is not configured.

use regex::{Regex, RegexBuilder};

use super::models::{Difficulty, Roadmap, RoadmapStep};
use crate::resume::parser::ResumeProfile;
use crate::skills::canonicalize_skills;

const FIRST_STEP_SKILL_LIMIT: usize = 6;
const DEEP_DIVE_SKILL_LIMIT: usize = 3;
const CAPSTONE_SKILL_LIMIT: usize = 5;
const SKILLS_REQUIRED_LIMIT: usize = 6;
/// Below this many current skills, a learner without evidenced proficiency starts as beginner.
const BEGINNER_SKILL_THRESHOLD: usize = 5;

pub const FALLBACK_TITLE: &str = "Personalized Learning Path";
pub const FALLBACK_DESCRIPTION: &str = "A practical roadmap tailored to your current skills and goals.";
pub const FALLBACK_DURATION: &str = "4-8 weeks";

/// Plans a four-step roadmap. Step orders are always `[1, 2, 3, 4]`.
pub fn plan_fallback_roadmap<C, T>(current_skills: &[C], target_skills: &[T], profile: &ResumeProfile) -> Roadmap
where
    C: AsRef<str>,
    T: AsRef<str>,
{
    let current = canonicalize_skills(current_skills);
    let target = canonicalize_skills(target_skills);
    let missing: Vec<String> = target
        .iter()
        .filter(|skill| !current.contains(skill))
        .cloned()
        .collect();

    let evidence = profile
        .experience
        .iter()
        .chain(&profile.projects)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n");
    let proficient: Vec<String> = current
        .iter()
        .filter(|skill| is_evidenced(skill, &evidence))
        .cloned()
        .collect();
    let start_advanced = !proficient.is_empty();

    let steps = vec![
        RoadmapStep {
            title: if start_advanced {
                "Advanced Architecture & Patterns"
            } else {
                "Focused Fundamentals"
            }
            .to_string(),
            description: if start_advanced {
                "Consolidate advanced patterns, architectural decisions, and best practices across your core stack."
            } else {
                "Quickly align foundational concepts for your target stack to eliminate gaps."
            }
            .to_string(),
            duration: "1-2 weeks".to_string(),
            skills: take(if start_advanced { &proficient } else { &current }, FIRST_STEP_SKILL_LIMIT),
            order: 1,
        },
        RoadmapStep {
            title: "Core Technologies Deep Dive".to_string(),
            description: "Hands-on learning for top missing technologies with guided exercises and mini-projects.".to_string(),
            duration: "1-2 weeks".to_string(),
            skills: take(&missing, DEEP_DIVE_SKILL_LIMIT),
            order: 2,
        },
        RoadmapStep {
            title: "Production Quality: Testing & Performance".to_string(),
            description: "Implement testing strategy, optimize performance, and prepare for deployment best practices.".to_string(),
            duration: "1-2 weeks".to_string(),
            skills: vec![
                "testing".to_string(),
                "performance".to_string(),
                "deployment".to_string(),
            ],
            order: 3,
        },
        RoadmapStep {
            title: "Capstone Project".to_string(),
            description: "Build a portfolio-grade project integrating advanced patterns and target technologies.".to_string(),
            duration: "2 weeks".to_string(),
            skills: take(if missing.is_empty() { &current } else { &missing }, CAPSTONE_SKILL_LIMIT),
            order: 4,
        },
    ];

    let difficulty = if start_advanced || current.len() >= BEGINNER_SKILL_THRESHOLD {
        Difficulty::Intermediate
    } else {
        Difficulty::Beginner
    };

    Roadmap {
        title: FALLBACK_TITLE.to_string(),
        description: FALLBACK_DESCRIPTION.to_string(),
        estimated_duration: FALLBACK_DURATION.to_string(),
        difficulty,
        steps,
        skills_required: take(&target, SKILLS_REQUIRED_LIMIT),
        skills_learned: missing,
        tags: vec![
            "roadmap".to_string(),
            "skill-gap".to_string(),
            "learning-path".to_string(),
        ],
        confidence: None,
        personalization_score: None,
    }
}

fn take(skills: &[String], limit: usize) -> Vec<String> {
    skills.iter().take(limit).cloned().collect()
}

/// True when `skill`, stripped of regex metacharacters, appears as a whole
/// word in the evidence text.
fn is_evidenced(skill: &str, evidence: &str) -> bool {
    let stripped: String = skill
        .chars()
        .filter(|c| !r"-/\^$*+?.()|[]{}".contains(*c))
        .collect();
    if stripped.trim().is_empty() || evidence.is_empty() {
        return false;
    }

    word_pattern(stripped.trim()).is_some_and(|re| re.is_match(evidence))
}

fn word_pattern(word: &str) -> Option<Regex> {
    RegexBuilder::new(&format!(r"\b{}\b", regex::escape(word)))
        .case_insensitive(true)
        .build()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(experience: &[&str], projects: &[&str]) -> ResumeProfile {
        ResumeProfile {
            experience: experience.iter().map(|s| s.to_string()).collect(),
            projects: projects.iter().map(|s| s.to_string()).collect(),
            ..ResumeProfile::default()
        }
    }

    #[test]
    fn test_always_four_ordered_steps() {
        let cases: Vec<(Vec<&str>, Vec<&str>)> = vec![
            (vec!["python"], vec!["python", "docker"]),
            (vec!["python", "sql"], vec![]),
            (vec!["react"], vec!["node", "express", "sql", "mongodb", "rest", "aws"]),
        ];
        for (current, target) in cases {
            let roadmap = plan_fallback_roadmap(&current, &target, &ResumeProfile::default());
            let orders: Vec<_> = roadmap.steps.iter().map(|s| s.order).collect();
            assert_eq!(orders, vec![1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_empty_target_keeps_steps_with_empty_skills() {
        let roadmap = plan_fallback_roadmap(&["python"], &[] as &[&str], &ResumeProfile::default());
        assert_eq!(roadmap.steps.len(), 4);
        assert!(roadmap.steps[1].skills.is_empty());
        assert_eq!(roadmap.steps[3].skills, vec!["python"]);
        assert!(roadmap.skills_learned.is_empty());
    }

    #[test]
    fn test_evidenced_skills_start_advanced() {
        let roadmap = plan_fallback_roadmap(
            &["python", "django", "figma"],
            &["python", "docker", "kubernetes"],
            &profile(&["Built billing services in Python"], &["Django admin dashboard"]),
        );
        assert_eq!(roadmap.steps[0].title, "Advanced Architecture & Patterns");
        assert_eq!(roadmap.steps[0].skills, vec!["python", "django"]);
        assert_eq!(roadmap.steps[1].skills, vec!["docker", "kubernetes"]);
        assert_eq!(roadmap.difficulty, Difficulty::Intermediate);
        assert_eq!(roadmap.skills_learned, vec!["docker", "kubernetes"]);
    }

    #[test]
    fn test_unevidenced_small_skill_set_is_beginner() {
        let roadmap = plan_fallback_roadmap(&["html", "css"], &["react"], &ResumeProfile::default());
        assert_eq!(roadmap.steps[0].title, "Focused Fundamentals");
        assert_eq!(roadmap.steps[0].skills, vec!["html", "css"]);
        assert_eq!(roadmap.difficulty, Difficulty::Beginner);
    }

    #[test]
    fn test_large_skill_set_without_evidence_is_intermediate() {
        let current = ["html", "css", "javascript", "react", "git"];
        let roadmap = plan_fallback_roadmap(&current, &["node"], &ResumeProfile::default());
        assert_eq!(roadmap.difficulty, Difficulty::Intermediate);
    }

    #[test]
    fn test_symbol_skills_are_matched_safely() {
        let roadmap = plan_fallback_roadmap(
            &["c++", "node.js"],
            &["rust"],
            &profile(&["Wrote C drivers and a Nodejs service"], &[]),
        );
        assert_eq!(roadmap.steps[0].title, "Advanced Architecture & Patterns");
        assert_eq!(roadmap.steps[0].skills, vec!["c++"]);
    }
}
