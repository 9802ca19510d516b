// Generator prompts for resume analysis: position inference and gap insights.

/// System prompt for position inference.
pub const POSITIONS_SYSTEM: &str = "You are a job-matching assistant. \
    Identify the top 3 most suitable job positions based on the candidate's resume. \
    For each position, include typical requirements and a confidence score (0.0-1.0).";

/// Position inference prompt. Replace `{skills_json}`, `{education_json}`,
/// `{experience_json}` and `{projects_json}` before sending.
pub const POSITIONS_PROMPT_TEMPLATE: &str = r#"Candidate resume summary (normalized):
Skills: {skills_json}
Education: {education_json}
Experience lines: {experience_json}
Projects: {projects_json}

Return JSON with this exact structure:
{
  "positions": [
    {
      "title": "string",
      "typicalRequirements": {
        "skills": ["string"],
        "tools": ["string"],
        "experienceYearsRange": "string",
        "education": "string",
        "certifications": ["string"]
      },
      "confidence": 0.0,
      "rationale": "string"
    }
  ]
}"#;

/// System prompt for gap insights.
pub const INSIGHTS_SYSTEM: &str = "You are a career coach. Provide concise, actionable guidance \
    as an array of insights, each including action, why and suggested resources.";

/// Gap insights prompt. Replace `{current_skills_json}` and
/// `{requirements_json}` before sending.
pub const INSIGHTS_PROMPT_TEMPLATE: &str = r#"Current skills: {current_skills_json}
Target requirements: {requirements_json}

Return JSON:
{
  "insights": [
    { "action": "string", "why": "string", "resources": ["string"], "timeline": "string" }
  ],
  "confidence": 0.0
}"#;
