//! Course Relevance Ranker.
//!
//! Category selection precedes ranking: `infer_course_category` maps a
//! free-text category plus keyword set to exactly one catalog key through an
//! ordered rule table (first match wins). Ranking is then a pure function of
//! the candidate list.
//!
//! Scoring per course title (case-insensitive substring tests):
//! - +30 if it contains the goal category string
//! - +10 per keyword longer than two characters that it contains
//!
//! Candidates are de-duplicated by normalized title, sorted by descending
//! score with a stable sort (ties keep catalog order), filtered to positive
//! scores at or above `min_score`, then truncated.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::catalog::CourseCandidate;
use crate::roadmap::models::Roadmap;

pub const CATEGORY_MATCH_SCORE: u32 = 30;
pub const KEYWORD_MATCH_SCORE: u32 = 10;
pub const DEFAULT_MAX_SUGGESTIONS: usize = 5;

static NON_KEYWORD_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9+\-\s]").expect("keyword filter pattern"));

/// A course with its relevance to a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCourse {
    pub title: String,
    pub url: String,
    pub category: String,
    pub relevance_score: u32,
    pub matched_keywords: Vec<String>,
    pub relevance_reasons: Vec<String>,
    pub description: String,
    #[serde(default)]
    pub is_popular_fallback: bool,
}

#[derive(Debug, Clone)]
pub struct RankOptions {
    pub max_suggestions: usize,
    /// Courses scoring below this are dropped. Non-positive scores always are.
    pub min_score: u32,
    pub goal_category: Option<String>,
    /// Keywords added after the roadmap's own (goal tags, goal skills).
    pub extra_keywords: Vec<String>,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            min_score: 0,
            goal_category: None,
            extra_keywords: Vec::new(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Category inference
// ────────────────────────────────────────────────────────────────────────────

/// One row of the category table. A rule fires when the goal category
/// contains any `category_terms` entry or any keyword hits a `keyword_terms`
/// entry.
struct CategoryRule {
    category_terms: &'static [&'static str],
    keyword_terms: &'static [&'static str],
    target: &'static str,
}

/// First match wins. Category terms are plain substrings of the goal
/// category, so short terms also hit inside longer words: "HTML & CSS"
/// resolves to `ds_course` through "ml", and "Building Apps" to `uiux_course`
/// through "ui". Keyword terms go through `keyword_hits` instead.
const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category_terms: &["data", "ml", "machine"],
        keyword_terms: &[],
        target: "ds_course",
    },
    CategoryRule {
        category_terms: &["web", "frontend", "full stack", "full-stack"],
        keyword_terms: &[],
        target: "web_course",
    },
    CategoryRule {
        category_terms: &["android"],
        keyword_terms: &["android", "kotlin"],
        target: "android_course",
    },
    CategoryRule {
        category_terms: &["ios", "swift"],
        keyword_terms: &["swift", "ios"],
        target: "ios_course",
    },
    CategoryRule {
        category_terms: &["ux", "ui", "design"],
        keyword_terms: &["ux", "ui", "design"],
        target: "uiux_course",
    },
    CategoryRule {
        category_terms: &[],
        keyword_terms: &["react", "node", "django", "flask"],
        target: "web_course",
    },
    CategoryRule {
        category_terms: &[],
        keyword_terms: &["tensorflow", "data", "machine"],
        target: "ds_course",
    },
];

/// A keyword hits a term when it equals it, or contains it and the term is
/// longer than two characters ("kotlin-coroutines" hits "kotlin", "build"
/// does not hit "ui").
fn keyword_hits(keyword: &str, term: &str) -> bool {
    keyword == term || (term.len() > 2 && keyword.contains(term))
}

/// Maps a goal category and keywords to one catalog key, or `None`.
pub fn infer_course_category<S: AsRef<str>>(goal_category: &str, keywords: &[S]) -> Option<&'static str> {
    let category = goal_category.to_lowercase();
    let keywords: Vec<String> = keywords
        .iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    CATEGORY_RULES
        .iter()
        .find(|rule| {
            rule.category_terms.iter().any(|term| category.contains(term))
                || keywords
                    .iter()
                    .any(|k| rule.keyword_terms.iter().any(|term| keyword_hits(k, term)))
        })
        .map(|rule| rule.target)
}

// ────────────────────────────────────────────────────────────────────────────
// Ranking
// ────────────────────────────────────────────────────────────────────────────

/// Scores, sorts, filters and truncates `candidates`.
pub fn rank_courses<S: AsRef<str>>(
    candidates: &[CourseCandidate],
    goal_category: &str,
    keywords: &[S],
    options: &RankOptions,
) -> Vec<ScoredCourse> {
    let category = goal_category.trim().to_lowercase();
    let keywords = dedup_lowercase(keywords);

    let mut seen_titles = HashSet::new();
    let mut scored: Vec<ScoredCourse> = candidates
        .iter()
        .filter(|c| seen_titles.insert(c.title.trim().to_lowercase()))
        .map(|c| score_course(c, &category, &keywords))
        .collect();

    scored.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    scored.retain(|c| c.relevance_score > 0 && c.relevance_score >= options.min_score);
    scored.truncate(options.max_suggestions);
    scored
}

fn score_course(candidate: &CourseCandidate, category: &str, keywords: &[String]) -> ScoredCourse {
    let title = candidate.title.to_lowercase();
    let mut score = 0;
    let mut reasons = Vec::new();

    if !category.is_empty() && title.contains(category) {
        score += CATEGORY_MATCH_SCORE;
        reasons.push("Matches goal category".to_string());
    }

    let matched: Vec<String> = keywords
        .iter()
        .filter(|k| k.len() > 2 && title.contains(k.as_str()))
        .cloned()
        .collect();
    score += KEYWORD_MATCH_SCORE * matched.len() as u32;
    if !matched.is_empty() {
        reasons.push(format!("Keyword match: {}", matched.join(", ")));
    }

    let description = if matched.is_empty() {
        "Relevant course for your goal.".to_string()
    } else {
        format!("Covers {} topics relevant to your roadmap.", matched.join(", "))
    };

    ScoredCourse {
        title: candidate.title.clone(),
        url: candidate.url.clone(),
        category: candidate.category.clone(),
        relevance_score: score,
        matched_keywords: matched,
        relevance_reasons: reasons,
        description,
        is_popular_fallback: false,
    }
}

fn dedup_lowercase<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty() && seen.insert(k.clone()))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Keyword collection
// ────────────────────────────────────────────────────────────────────────────

/// Lowercase word tokens; characters outside `[a-z0-9+-]` act as separators.
pub fn tokenize_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_KEYWORD_CHARS
        .replace_all(&lowered, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Tokens from step titles, descriptions and skills, then `extra`, tags,
/// required and learned skills. De-duplicated, first occurrence kept.
pub fn collect_roadmap_keywords(roadmap: &Roadmap, extra: &[String]) -> Vec<String> {
    let step_text = roadmap.steps.iter().flat_map(|step| {
        [step.title.as_str(), step.description.as_str()]
            .into_iter()
            .chain(step.skills.iter().map(String::as_str))
    });
    let trailing = extra
        .iter()
        .chain(&roadmap.tags)
        .chain(&roadmap.skills_required)
        .chain(&roadmap.skills_learned)
        .map(String::as_str);

    let mut seen = HashSet::new();
    step_text
        .chain(trailing)
        .flat_map(tokenize_keywords)
        .filter(|token| seen.insert(token.clone()))
        .collect()
}
