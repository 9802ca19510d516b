// Shared prompt constants and prompt-building utilities.
// Each service that needs generator calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction appended to every roadmap prompt so truncated output keeps the steps.
pub const STEPS_FIRST_INSTRUCTION: &str = "\
    If you are running out of space, return the complete steps array first \
    and keep titles and descriptions concise.";
