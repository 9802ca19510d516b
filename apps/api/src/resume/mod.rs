// Resume analysis: text extraction, parsing, position inference, gap
// insights and the cached analysis pipeline.
// Extraction is CPU-bound and must run inside tokio::task::spawn_blocking.

pub mod analyzer;
pub mod cache;
pub mod extract;
pub mod handlers;
pub mod insights;
pub mod parser;
pub mod positions;
pub mod prompts;

pub use analyzer::ResumeAnalyzer;
