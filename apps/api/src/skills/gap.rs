use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::registry::canonicalize_skills;

/// Set comparison between a candidate's skills and a target skill list.
/// `matched` and `missing` follow target order; `irrelevant` follows current order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGapResult {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub irrelevant: Vec<String>,
    pub gap_size: usize,
}

impl SkillGapResult {
    /// `matched / (matched + missing)` while a gap exists, else `default`.
    pub fn confidence_or(&self, default: f64) -> f64 {
        if self.missing.is_empty() {
            return default;
        }
        self.matched.len() as f64 / (self.matched.len() + self.missing.len()) as f64
    }
}

/// Compares two raw skill lists by exact canonical-name equality.
pub fn analyze_skill_gap<C, T>(current_skills: &[C], target_skills: &[T]) -> SkillGapResult
where
    C: AsRef<str>,
    T: AsRef<str>,
{
    let current = canonicalize_skills(current_skills);
    let target = canonicalize_skills(target_skills);

    let current_set: HashSet<&str> = current.iter().map(String::as_str).collect();
    let target_set: HashSet<&str> = target.iter().map(String::as_str).collect();

    let (matched, missing): (Vec<String>, Vec<String>) = target
        .iter()
        .cloned()
        .partition(|skill| current_set.contains(skill.as_str()));

    let irrelevant = current
        .iter()
        .filter(|skill| !target_set.contains(skill.as_str()))
        .cloned()
        .collect();

    SkillGapResult {
        gap_size: missing.len(),
        matched,
        missing,
        irrelevant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matched_and_missing_partition_the_target() {
        let current = ["Python", "ReactJS", "SQL", "Figma"];
        let target = ["react", "python", "docker", "Docker", "kubernetes"];
        let gap = analyze_skill_gap(&current, &target);

        assert_eq!(gap.matched, vec!["react", "python"]);
        assert_eq!(gap.missing, vec!["docker", "kubernetes"]);
        assert!(gap.matched.iter().all(|s| !gap.missing.contains(s)));

        let mut union: Vec<String> = gap.matched.iter().chain(&gap.missing).cloned().collect();
        union.sort();
        let mut canonical_target = canonicalize_skills(&target);
        canonical_target.sort();
        assert_eq!(union, canonical_target);
    }

    #[test]
    fn test_gap_invariants_hold_across_skill_lists() {
        let cases: &[(&[&str], &[&str])] = &[
            (&[], &["python", "docker"]),
            (&["python", "docker"], &[]),
            (&[], &[]),
            (&["python", "docker", "aws"], &["python", "docker", "aws"]),
            (&["Python", "python", "PYTHON"], &["python", "Python", "docker", "docker"]),
            (&["nodejs"], &["node"]),
            (&["node.js", "ReactJS"], &["Node", "react", "react native", "go"]),
            (&["figma", "sql"], &["kubernetes", "terraform"]),
        ];

        for &(current, target) in cases {
            let gap = analyze_skill_gap(current, target);
            let canonical_current = canonicalize_skills(current);
            let canonical_target = canonicalize_skills(target);

            assert!(
                gap.matched.iter().all(|s| !gap.missing.contains(s)),
                "matched and missing overlap for {current:?} / {target:?}"
            );

            let union: HashSet<&String> = gap.matched.iter().chain(&gap.missing).collect();
            let target_set: HashSet<&String> = canonical_target.iter().collect();
            assert_eq!(union, target_set, "union differs for {current:?} / {target:?}");
            assert_eq!(
                gap.matched.len() + gap.missing.len(),
                canonical_target.len(),
                "duplicates leaked for {current:?} / {target:?}"
            );

            assert_eq!(gap.gap_size, gap.missing.len());

            let expected_irrelevant: Vec<String> = canonical_current
                .iter()
                .filter(|s| !target_set.contains(s))
                .cloned()
                .collect();
            assert_eq!(gap.irrelevant, expected_irrelevant);
        }

        let synonym_only = analyze_skill_gap(&["nodejs"], &["node"]);
        assert_eq!(synonym_only.matched, vec!["node"]);
        assert!(synonym_only.missing.is_empty());
        assert!(synonym_only.irrelevant.is_empty());
    }

    #[test]
    fn test_irrelevant_is_current_minus_target() {
        let gap = analyze_skill_gap(&["python", "figma", "sql"], &["python"]);
        assert_eq!(gap.irrelevant, vec!["figma", "sql"]);
        assert_eq!(gap.gap_size, 0);
    }

    #[test]
    fn test_empty_target() {
        let gap = analyze_skill_gap(&["python"], &[] as &[&str]);
        assert!(gap.matched.is_empty());
        assert!(gap.missing.is_empty());
        assert_eq!(gap.confidence_or(0.85), 0.85);
    }

    #[test]
    fn test_confidence_is_match_ratio() {
        let gap = analyze_skill_gap(&["python"], &["python", "docker", "kubernetes", "aws"]);
        assert!((gap.confidence_or(0.85) - 0.25).abs() < f64::EPSILON);

        let full = analyze_skill_gap(&["python", "docker"], &["docker"]);
        assert_eq!(full.confidence_or(0.8), 0.8);
    }

    #[test]
    fn test_gap_serializes_camel_case() {
        let gap = analyze_skill_gap(&["python"], &["docker"]);
        let json = serde_json::to_value(&gap).unwrap();
        assert_eq!(json["gapSize"], 1);
    }
}
