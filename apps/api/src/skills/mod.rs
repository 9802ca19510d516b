// Skill vocabulary, lexical extraction and gap analysis.
// Everything here is pure and synchronous: no generator calls, no I/O.

pub mod gap;
pub mod registry;

pub use gap::{analyze_skill_gap, SkillGapResult};
pub use registry::{canonicalize_skills, match_skills_in_text, SkillRegistry};
