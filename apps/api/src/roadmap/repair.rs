//! Roadmap response repair.
//!
//! Pipeline, in order:
//! 1. strip Markdown code fences
//! 2. cut from the first `{` to its matching `}`, dropping trailing text
//! 3. strict JSON parse, then field validation
//! 4. if the strict parse fails, field-level reconstruction from the raw text
//!
//! Reconstruction extracts `title`, `description`, `estimatedDuration` and
//! `difficulty` individually, then the `steps` array (salvaging every complete
//! step object when the array is cut off). With no usable step a single
//! placeholder step is emitted so the shape invariant holds.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use super::models::{Difficulty, Roadmap, RoadmapStep};
use crate::llm_client::repair::{
    complete_objects, find_matching_close, isolate_json_object, strip_code_fences,
};

pub const DEFAULT_TITLE: &str = "Learning Roadmap";
pub const DEFAULT_DESCRIPTION: &str = "A personalized learning roadmap.";
pub const DEFAULT_ESTIMATED_DURATION: &str = "3-6 months";
pub const DEFAULT_STEP_DESCRIPTION: &str = "Work through this stage of the roadmap.";
pub const DEFAULT_STEP_DURATION: &str = "1-2 weeks";

static TITLE_FIELD: Lazy<Regex> = Lazy::new(|| string_field_pattern("title"));
static DESCRIPTION_FIELD: Lazy<Regex> = Lazy::new(|| string_field_pattern("description"));
static DURATION_FIELD: Lazy<Regex> = Lazy::new(|| string_field_pattern("estimatedDuration"));
static DIFFICULTY_FIELD: Lazy<Regex> = Lazy::new(|| string_field_pattern("difficulty"));
static STEPS_ARRAY_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""steps"\s*:\s*\["#).expect("steps array pattern"));

fn string_field_pattern(field: &str) -> Regex {
    Regex::new(&format!(r#""{field}"\s*:\s*"((?:[^"\\]|\\.)*)""#)).expect("string field pattern")
}

/// How a roadmap was recovered from generator text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairOutcome {
    Parsed,
    Reconstructed,
}

/// Runs the repair pipeline. `Err` carries the validation failure reason and
/// means the caller should retry.
pub fn repair_roadmap_response(text: &str) -> Result<(Roadmap, RepairOutcome), String> {
    let cleaned = strip_code_fences(text);
    let strict = isolate_json_object(&cleaned).and_then(|candidate| {
        serde_json::from_str::<Value>(candidate).ok()
    });

    match strict {
        Some(value) => roadmap_from_value(&value)
            .map(|roadmap| (roadmap, RepairOutcome::Parsed))
            .ok_or_else(|| "AI response missing required fields".to_string()),
        None => {
            warn!("Roadmap response is not valid JSON; reconstructing fields");
            roadmap_from_value(&reconstruct_roadmap_value(text))
                .map(|roadmap| (roadmap, RepairOutcome::Reconstructed))
                .ok_or_else(|| "AI returned invalid JSON format".to_string())
        }
    }
}

/// Extracts a steps array from a steps-only response (`{"steps": [...]}` or a
/// bare array). `None` when nothing usable is found.
pub fn parse_steps_response(text: &str) -> Option<Vec<RoadmapStep>> {
    let cleaned = strip_code_fences(text);
    let value: Value = if cleaned.trim_start().starts_with('[') {
        serde_json::from_str(cleaned.trim()).ok()?
    } else {
        serde_json::from_str(isolate_json_object(&cleaned)?).ok()?
    };

    let steps = match &value {
        Value::Array(items) => items,
        Value::Object(map) => map.get("steps")?.as_array()?,
        _ => return None,
    };
    let steps = steps_from_values(steps);
    (!steps.is_empty()).then_some(steps)
}

// ────────────────────────────────────────────────────────────────────────────
// Validation and normalization
// ────────────────────────────────────────────────────────────────────────────

/// Builds a roadmap from loosely-typed JSON, backfilling every omitted text
/// field. `None` unless `title` is a non-empty string and `steps` a non-empty
/// array with at least one usable step.
pub fn roadmap_from_value(value: &Value) -> Option<Roadmap> {
    let title = non_empty_str(value.get("title"))?;
    let steps = steps_from_values(value.get("steps")?.as_array()?);
    if steps.is_empty() {
        return None;
    }

    Some(Roadmap {
        title: title.to_string(),
        description: non_empty_str(value.get("description"))
            .unwrap_or(DEFAULT_DESCRIPTION)
            .to_string(),
        estimated_duration: non_empty_str(value.get("estimatedDuration"))
            .unwrap_or(DEFAULT_ESTIMATED_DURATION)
            .to_string(),
        difficulty: non_empty_str(value.get("difficulty"))
            .map(Difficulty::parse_lenient)
            .unwrap_or_default(),
        steps,
        skills_required: string_list(value.get("skillsRequired")),
        skills_learned: string_list(value.get("skillsLearned")),
        tags: string_list(value.get("tags")),
        confidence: value.get("confidence").and_then(Value::as_f64),
        personalization_score: value.get("personalizationScore").and_then(Value::as_f64),
    })
}

fn steps_from_values(values: &[Value]) -> Vec<RoadmapStep> {
    values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| step_from_value(index, value))
        .collect()
}

fn step_from_value(index: usize, value: &Value) -> Option<RoadmapStep> {
    let position = index as u32 + 1;
    match value {
        Value::String(title) if !title.trim().is_empty() => Some(RoadmapStep {
            title: title.trim().to_string(),
            description: DEFAULT_STEP_DESCRIPTION.to_string(),
            duration: DEFAULT_STEP_DURATION.to_string(),
            skills: Vec::new(),
            order: position,
        }),
        Value::Object(_) => Some(RoadmapStep {
            title: non_empty_str(value.get("title"))
                .map(str::to_string)
                .unwrap_or_else(|| format!("Step {position}")),
            description: non_empty_str(value.get("description"))
                .unwrap_or(DEFAULT_STEP_DESCRIPTION)
                .to_string(),
            duration: non_empty_str(value.get("duration"))
                .unwrap_or(DEFAULT_STEP_DURATION)
                .to_string(),
            skills: string_list(value.get("skills")),
            order: value
                .get("order")
                .and_then(order_number)
                .unwrap_or(position),
        }),
        _ => None,
    }
}

fn order_number(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// String arrays pass through trimmed; a lone string becomes a one-item list.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field-level reconstruction
// ────────────────────────────────────────────────────────────────────────────

/// Rebuilds a roadmap object from text that failed strict parsing. The result
/// always has a title and at least one step.
pub fn reconstruct_roadmap_value(text: &str) -> Value {
    let field = |pattern: &Regex, default: &str| {
        pattern
            .captures(text)
            .map(|caps| unescape_json_string(&caps[1]))
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    let mut steps = extract_steps(text);
    if steps.is_empty() {
        warn!("No steps recoverable from roadmap response; using placeholder step");
        steps.push(placeholder_step());
    }

    serde_json::json!({
        "title": field(&TITLE_FIELD, DEFAULT_TITLE),
        "description": field(&DESCRIPTION_FIELD, DEFAULT_DESCRIPTION),
        "estimatedDuration": field(&DURATION_FIELD, DEFAULT_ESTIMATED_DURATION),
        "difficulty": field(&DIFFICULTY_FIELD, Difficulty::Beginner.as_str()),
        "steps": steps,
    })
}

fn extract_steps(text: &str) -> Vec<Value> {
    let Some(found) = STEPS_ARRAY_START.find(text) else {
        return Vec::new();
    };
    let open = found.end() - 1;

    if let Some(close) = find_matching_close(text, open, b'[', b']') {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(&text[open..close]) {
            return items;
        }
        return parse_objects(&text[open + 1..close - 1]);
    }

    // Unterminated array: keep every step object that closed.
    parse_objects(&text[open + 1..])
}

fn parse_objects(body: &str) -> Vec<Value> {
    complete_objects(body)
        .into_iter()
        .filter_map(|object| serde_json::from_str::<Value>(object).ok())
        .collect()
}

fn placeholder_step() -> Value {
    serde_json::json!({
        "title": "Step 1: Foundation",
        "description": "Start with the basics.",
        "duration": "1 week",
        "skills": ["Fundamentals"],
        "order": 1
    })
}

fn unescape_json_string(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{raw}\"")).unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_response_with_trailing_text_parses() {
        let text = "```json\n{\"title\":\"Rust\",\"steps\":[{\"title\":\"A\",\"skills\":[\"x\"]}]}\n```\nEnjoy!";
        let (roadmap, outcome) = repair_roadmap_response(text).unwrap();
        assert_eq!(outcome, RepairOutcome::Parsed);
        assert_eq!(roadmap.title, "Rust");
        assert_eq!(roadmap.estimated_duration, DEFAULT_ESTIMATED_DURATION);
        assert_eq!(roadmap.steps[0].duration, DEFAULT_STEP_DURATION);
    }

    #[test]
    fn test_truncated_roadmap_reconstructs_with_placeholder() {
        let text = r#"{"title":"X","steps":[{"title":"A""#;
        let (roadmap, outcome) = repair_roadmap_response(text).unwrap();
        assert_eq!(outcome, RepairOutcome::Reconstructed);
        assert_eq!(roadmap.title, "X");
        assert_eq!(roadmap.steps.len(), 1);
        assert_eq!(roadmap.steps[0].title, "Step 1: Foundation");
        assert_eq!(roadmap.description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn test_truncated_steps_salvage_complete_objects() {
        let text = r#"{"title":"Go Backend","difficulty":"Intermediate","steps":[{"title":"A","order":1},{"title":"B {x}","order":2},{"title":"C","desc"#;
        let (roadmap, outcome) = repair_roadmap_response(text).unwrap();
        assert_eq!(outcome, RepairOutcome::Reconstructed);
        assert_eq!(roadmap.difficulty, Difficulty::Intermediate);
        let titles: Vec<_> = roadmap.steps.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B {x}"]);
    }

    #[test]
    fn test_prose_reconstructs_defaults() {
        let (roadmap, _) = repair_roadmap_response("Sorry, I cannot do that.").unwrap();
        assert_eq!(roadmap.title, DEFAULT_TITLE);
        assert_eq!(roadmap.steps.len(), 1);
    }

    #[test]
    fn test_valid_json_missing_steps_is_rejected() {
        assert!(repair_roadmap_response(r#"{"title":"Only a title"}"#).is_err());
        assert!(repair_roadmap_response(r#"{"title":"","steps":[{"title":"A"}]}"#).is_err());
        assert!(repair_roadmap_response(r#"{"title":"T","steps":[]}"#).is_err());
    }

    #[test]
    fn test_escaped_title_is_unescaped() {
        let text = r#"{"title":"The \"Rust\" Way","steps":[{"title":"A"}"#;
        let (roadmap, _) = repair_roadmap_response(text).unwrap();
        assert_eq!(roadmap.title, "The \"Rust\" Way");
        assert_eq!(roadmap.steps[0].title, "A");
    }

    #[test]
    fn test_step_orders_are_kept_until_reindexed() {
        let text = r#"{"title":"T","steps":[{"title":"a","order":5},{"title":"b","order":"2"},{"title":"c"}]}"#;
        let (mut roadmap, _) = repair_roadmap_response(text).unwrap();
        let before: Vec<_> = roadmap.steps.iter().map(|s| s.order).collect();
        assert_eq!(before, vec![5, 2, 3]);
        roadmap.reindex_steps();
        let after: Vec<_> = roadmap.steps.iter().map(|s| s.order).collect();
        assert_eq!(after, vec![1, 2, 3]);
    }

    #[test]
    fn test_parse_steps_response_variants() {
        let wrapped = r#"{"steps":[{"title":"a"},{"title":"b"}]}"#;
        assert_eq!(parse_steps_response(wrapped).unwrap().len(), 2);
        let bare = "```json\n[{\"title\":\"a\"}]\n```";
        assert_eq!(parse_steps_response(bare).unwrap().len(), 1);
        assert!(parse_steps_response("{\"steps\": []}").is_none());
        assert!(parse_steps_response("no json").is_none());
    }
}
