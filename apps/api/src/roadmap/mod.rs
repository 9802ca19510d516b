// Roadmap generation: data model, response repair, generative synthesis with
// retries, the deterministic fallback planner, goal enhancement and handlers.

pub mod enhance;
pub mod fallback;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod repair;
pub mod service;
pub mod synthesizer;

pub use service::RoadmapService;
pub use synthesizer::RoadmapSynthesizer;
