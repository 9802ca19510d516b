use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::catalog::CourseCatalog;
use super::ranker::ScoredCourse;
use crate::roadmap::models::Difficulty;

pub const POPULAR_COURSE_SCORE: u32 = 50;
pub const POPULAR_COURSE_LIMIT: usize = 3;

/// Best-effort source of generally popular courses, used when ranking finds
/// nothing relevant.
#[async_trait]
pub trait PopularCourses: Send + Sync {
    async fn popular_courses(&self, difficulty: Difficulty, limit: usize) -> Vec<ScoredCourse>;
}

/// Serves popular courses straight from the catalog: the first course of each
/// category in turn (categories sorted), then the second of each, until `limit`.
pub struct CatalogPopularCourses {
    catalog: Arc<dyn CourseCatalog>,
}

impl CatalogPopularCourses {
    pub fn new(catalog: Arc<dyn CourseCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl PopularCourses for CatalogPopularCourses {
    async fn popular_courses(&self, difficulty: Difficulty, limit: usize) -> Vec<ScoredCourse> {
        // The catalog carries no difficulty data, so every level gets the same picks.
        debug!("Selecting {limit} popular courses for {difficulty} roadmap");

        let per_category: Vec<_> = self
            .catalog
            .categories()
            .iter()
            .map(|key| self.catalog.courses(key))
            .collect();
        let deepest = per_category.iter().map(Vec::len).max().unwrap_or(0);

        (0..deepest)
            .flat_map(|rank| per_category.iter().filter_map(move |courses| courses.get(rank)))
            .take(limit)
            .map(|course| ScoredCourse {
                title: course.title.clone(),
                url: course.url.clone(),
                category: course.category.clone(),
                relevance_score: POPULAR_COURSE_SCORE,
                matched_keywords: Vec::new(),
                relevance_reasons: vec!["Popular course".to_string()],
                description: "A popular course while no closer match is available.".to_string(),
                is_popular_fallback: true,
            })
            .collect()
    }
}
