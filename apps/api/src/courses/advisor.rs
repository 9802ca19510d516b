use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::catalog::CourseCatalog;
use super::popular::{PopularCourses, POPULAR_COURSE_LIMIT};
use super::ranker::{
    collect_roadmap_keywords, infer_course_category, rank_courses, tokenize_keywords,
    RankOptions, ScoredCourse,
};
use crate::roadmap::models::Roadmap;

/// Course suggestions attached to a roadmap or position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecommendations {
    /// Catalog key the suggestions were drawn from, if one was inferred.
    pub category: Option<String>,
    pub suggestions: Vec<ScoredCourse>,
    /// True when `suggestions` came from the popular-course source.
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Joins the catalog, the ranker and the popular-course source.
pub struct CourseAdvisor {
    catalog: Arc<dyn CourseCatalog>,
    popular: Arc<dyn PopularCourses>,
}

impl CourseAdvisor {
    pub fn new(catalog: Arc<dyn CourseCatalog>, popular: Arc<dyn PopularCourses>) -> Self {
        Self { catalog, popular }
    }

    /// Ranked courses for a roadmap. Never fails: no category, an empty
    /// catalog or no relevant course all yield an empty list.
    pub fn rank_courses_for_roadmap(&self, roadmap: &Roadmap, options: &RankOptions) -> Vec<ScoredCourse> {
        self.rank_roadmap(roadmap, options).1
    }

    /// Infers the category once and ranks that category's courses.
    fn rank_roadmap(&self, roadmap: &Roadmap, options: &RankOptions) -> (Option<&'static str>, Vec<ScoredCourse>) {
        let keywords = collect_roadmap_keywords(roadmap, &options.extra_keywords);
        let goal_category = options.goal_category.as_deref().unwrap_or_default();

        let Some(category) = infer_course_category(goal_category, &keywords) else {
            debug!("No course category for roadmap '{}'", roadmap.title);
            return (None, Vec::new());
        };

        let candidates = self.catalog.courses(category);
        if candidates.is_empty() {
            warn!("Course catalog has no '{category}' entries");
            return (Some(category), Vec::new());
        }

        (
            Some(category),
            rank_courses(&candidates, goal_category, &keywords, options),
        )
    }

    /// Ranked suggestions for a roadmap, substituting popular courses when
    /// nothing relevant is found.
    pub async fn suggest_for_roadmap(&self, roadmap: &Roadmap, options: &RankOptions) -> CourseRecommendations {
        let (category, suggestions) = self.rank_roadmap(roadmap, options);

        if !suggestions.is_empty() {
            return CourseRecommendations {
                category: category.map(str::to_string),
                suggestions,
                fallback: false,
                message: None,
            };
        }

        warn!(
            "No relevant courses for roadmap '{}'; using popular courses",
            roadmap.title
        );
        let popular = self
            .popular
            .popular_courses(roadmap.difficulty, POPULAR_COURSE_LIMIT)
            .await;
        CourseRecommendations {
            category: category.map(str::to_string),
            suggestions: popular,
            fallback: true,
            message: Some(
                "Showing popular courses as no highly relevant courses were found".to_string(),
            ),
        }
    }

    /// Ranked suggestions for a target position. Keywords are the missing
    /// skills followed by the position title's tokens.
    pub fn recommend_for_position(&self, missing: &[String], position_title: &str) -> CourseRecommendations {
        let keywords: Vec<String> = missing
            .iter()
            .cloned()
            .chain(tokenize_keywords(position_title))
            .collect();

        let Some(category) = infer_course_category(position_title, &keywords) else {
            return CourseRecommendations {
                message: Some("No matching course category".to_string()),
                ..CourseRecommendations::default()
            };
        };

        let suggestions = rank_courses(
            &self.catalog.courses(category),
            position_title,
            &keywords,
            &RankOptions::default(),
        );
        CourseRecommendations {
            category: Some(category.to_string()),
            suggestions,
            fallback: false,
            message: None,
        }
    }
}
