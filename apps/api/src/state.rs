use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::courses::{CatalogPopularCourses, CourseAdvisor, CourseCatalog};
use crate::llm_client::TextGenerator;
use crate::resume::ResumeAnalyzer;
use crate::roadmap::{RoadmapService, RoadmapSynthesizer};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// The single generator backend. `LlmClient::Disabled` when unconfigured.
    pub llm: Arc<dyn TextGenerator>,
    pub courses: Arc<CourseAdvisor>,
    pub roadmaps: Arc<RoadmapService>,
    /// Owns the process-wide analysis cache.
    pub analyzer: Arc<ResumeAnalyzer>,
}

impl AppState {
    /// Wires every service around one generator and one course catalog.
    pub fn new(config: Config, llm: Arc<dyn TextGenerator>, catalog: Arc<dyn CourseCatalog>) -> Self {
        let popular = Arc::new(CatalogPopularCourses::new(catalog.clone()));
        let courses = Arc::new(CourseAdvisor::new(catalog, popular));
        let roadmaps = Arc::new(RoadmapService::new(
            RoadmapSynthesizer::new(llm.clone(), courses.clone()),
            courses.clone(),
        ));
        let analyzer = Arc::new(ResumeAnalyzer::new(
            llm.clone(),
            courses.clone(),
            Duration::from_secs(config.analysis_cache_ttl_secs),
        ));

        Self {
            config,
            llm,
            courses,
            roadmaps,
            analyzer,
        }
    }
}
