//! Resume parser: raw resume text to a structured `ResumeProfile`.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::skills::{canonicalize_skills, match_skills_in_text};

/// Upper bound on captured lines per section.
pub const MAX_SECTION_LINES: usize = 20;

const DEGREE_KEYWORDS: &[&str] = &[
    "bachelor", "master", "phd", "b.tech", "m.tech", "bsc", "msc", "bs", "ms", "be", "me", "mba",
    "degree", "diploma",
];

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}").expect("email pattern")
});
static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+\d{1,3}[\s-]?)?(?:\(?\d{3}\)?[\s-]?)?\d{3}[\s-]?\d{4}").expect("phone pattern")
});
static NON_TOKEN_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9+.#\-\s]").expect("token filter pattern"));

static EXPERIENCE_SECTION: Lazy<SectionScanner> = Lazy::new(|| {
    SectionScanner::new(
        r"experience|work history|employment",
        r"education|skills|projects|certifications",
    )
});
static PROJECTS_SECTION: Lazy<SectionScanner> = Lazy::new(|| {
    SectionScanner::new(
        r"projects|project experience|selected projects",
        r"education|skills|experience|work history|employment|certifications",
    )
});

/// Structured view of one resume. Built fresh per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeProfile {
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Canonical, de-duplicated, first-seen order.
    pub skills: Vec<String>,
    /// Degree keywords present in the text.
    pub education: Vec<String>,
    pub experience: Vec<String>,
    pub projects: Vec<String>,
}

pub fn parse_resume_text(text: &str) -> ResumeProfile {
    let tokens: HashSet<String> = normalize_tokens(text).into_iter().collect();

    let education = DEGREE_KEYWORDS
        .iter()
        .filter(|degree| tokens.contains(**degree))
        .map(|degree| degree.to_string())
        .collect();

    ResumeProfile {
        email: EMAIL.find(text).map(|m| m.as_str().to_string()),
        phone: PHONE.find(text).map(|m| m.as_str().to_string()),
        skills: canonicalize_skills(&match_skills_in_text(text)),
        education,
        experience: EXPERIENCE_SECTION.capture(text),
        projects: PROJECTS_SECTION.capture(text),
    }
}

/// Lowercase word list; characters outside `[a-z0-9+.#-]` act as separators.
pub fn normalize_tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_TOKEN_CHARS
        .replace_all(&lowered, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Section scanning
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanMode {
    Idle,
    Capturing,
}

/// Two-state line scanner: a start heading switches to capturing, a stop
/// heading switches back. Heading lines themselves are never captured, and a
/// start heading wins when a line matches both sets.
pub struct SectionScanner {
    start: Regex,
    stop: Regex,
}

impl SectionScanner {
    fn new(start: &str, stop: &str) -> Self {
        Self {
            start: Regex::new(&format!("(?i){start}")).expect("section start pattern"),
            stop: Regex::new(&format!("(?i){stop}")).expect("section stop pattern"),
        }
    }

    pub fn capture(&self, text: &str) -> Vec<String> {
        let mut mode = ScanMode::Idle;
        let mut captured = Vec::new();

        for line in text.lines() {
            if self.start.is_match(line) {
                mode = ScanMode::Capturing;
                continue;
            }
            if mode == ScanMode::Capturing && self.stop.is_match(line) {
                mode = ScanMode::Idle;
                continue;
            }
            if mode == ScanMode::Capturing {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    captured.push(trimmed.to_string());
                }
            }
        }

        captured.truncate(MAX_SECTION_LINES);
        captured
    }
}
