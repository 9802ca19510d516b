// Generator prompts for roadmap synthesis and goal enhancement.
// Templates use `{placeholder}` markers filled with `str::replace`.

use serde_json::{json, Value};

/// System prompt for full roadmap generation (goal and resume paths).
pub const ROADMAP_SYSTEM: &str = "You are an expert curriculum designer. \
    Prioritize complete step-by-step content over headings and descriptions.";

/// Extra system guidance for resume-driven roadmaps.
pub const RESUME_ROADMAP_SYSTEM: &str = "You are an expert curriculum designer. \
    Personalize strictly to the candidate's resume and target position. \
    Avoid generic advice.";

/// Goal roadmap prompt. Replace `{goal_details}` before sending.
pub const GOAL_ROADMAP_PROMPT_TEMPLATE: &str = r#"Create a comprehensive learning roadmap for the following goal:

{goal_details}

Return a JSON object with this exact structure (ensure steps are complete):
{
  "title": "engaging title for the roadmap",
  "description": "brief overview of what the user will learn",
  "estimatedDuration": "e.g. '3-6 months', '12-16 weeks'",
  "difficulty": "beginner | intermediate | advanced",
  "steps": [
    {
      "title": "step title",
      "description": "detailed description of what to learn or do",
      "duration": "e.g. '2 weeks', '1 month'",
      "skills": ["skill 1", "skill 2", "skill 3"],
      "order": 1
    }
  ],
  "skillsRequired": ["prerequisite skill"],
  "skillsLearned": ["skill learned"],
  "tags": ["tag"]
}

Requirements:
- Include at least 6 detailed steps that progressively build skills
- Each step should have 3-5 specific skills to learn
- Be specific and actionable with realistic time estimates"#;

/// Resume roadmap prompt. Replace `{skills_json}`, `{education_json}`,
/// `{experience_json}`, `{projects_json}`, `{target_position}` and
/// `{requirements_json}` before sending.
pub const RESUME_ROADMAP_PROMPT_TEMPLATE: &str = r#"Candidate resume:
Skills: {skills_json}
Education: {education_json}
Experience: {experience_json}
Projects: {projects_json}

Target position: {target_position}
Target requirements: {requirements_json}

Return a JSON object with this structure:
{
  "title": "string",
  "description": "string",
  "estimatedDuration": "string",
  "difficulty": "beginner | intermediate | advanced",
  "steps": [
    { "title": "string", "description": "string", "duration": "string", "skills": ["string"], "order": 1 }
  ],
  "skillsRequired": ["string"],
  "skillsLearned": ["string"],
  "tags": ["string"],
  "confidence": 0.0,
  "personalizationScore": 0.0
}

Include at least 6 steps that close the gap between the resume and the target."#;

/// System prompt for the supplemental steps-only request.
pub const STEPS_ONLY_SYSTEM: &str = "Provide a complete 'steps' array of at least 6 items. \
    Skip headings and extra description.";

/// Steps-only prompt. Replace `{subject}` before sending.
pub const STEPS_ONLY_PROMPT_TEMPLATE: &str = "For {subject}, generate a complete steps array \
    (minimum 6) with ordered items containing title, description, duration and skills. \
    Start order at 1. Return {\"steps\": [...]}.";

/// System prompt for goal enhancement.
pub const ENHANCE_GOAL_SYSTEM: &str = "You are an expert career counselor. \
    Analyze the user's career goal and provide structured information \
    to help categorize and understand it better.";

/// Goal enhancement prompt. Replace `{goal_text}` before sending.
pub const ENHANCE_GOAL_PROMPT_TEMPLATE: &str = r#"Analyze this career/learning goal and return structured information:

Goal: "{goal_text}"

Return a JSON object with this structure:
{
  "suggestedName": "clear, concise goal name",
  "category": "one of: Web Development, Mobile Development, Data Science, Machine Learning, DevOps, Cybersecurity, UI/UX Design, Cloud Computing, Backend Development, Frontend Development, Full Stack Development, Game Development, Blockchain, Other",
  "difficulty": "exactly one of: beginner, intermediate, advanced",
  "estimatedTime": "e.g. '3-6 months'",
  "description": "2-3 sentence description",
  "tags": ["tag 1", "tag 2", "tag 3"],
  "skillsRequired": ["prerequisite 1", "prerequisite 2"],
  "skillsLearned": ["skill 1", "skill 2", "skill 3"]
}

The difficulty field MUST be exactly "beginner", "intermediate" or "advanced". Do not combine values."#;

fn step_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "description": { "type": "string" },
            "duration": { "type": "string" },
            "skills": { "type": "array", "items": { "type": "string" } },
            "order": { "type": "integer" }
        },
        "required": ["title", "description", "duration", "skills", "order"]
    })
}

/// Schema sent with full roadmap requests.
pub fn roadmap_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "description": { "type": "string" },
            "estimatedDuration": { "type": "string" },
            "difficulty": { "type": "string", "enum": ["beginner", "intermediate", "advanced"] },
            "steps": { "type": "array", "minItems": 6, "items": step_schema() },
            "skillsRequired": { "type": "array", "items": { "type": "string" } },
            "skillsLearned": { "type": "array", "items": { "type": "string" } },
            "tags": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["title", "description", "estimatedDuration", "difficulty", "steps"]
    })
}

/// Stricter schema for the supplemental steps-only request.
pub fn steps_only_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "steps": { "type": "array", "minItems": 6, "items": step_schema() }
        },
        "required": ["steps"]
    })
}
