// Course recommendations: catalog source, relevance ranking and the
// popular-course fallback. Catalog data is loaded once at startup.

pub mod advisor;
pub mod catalog;
pub mod handlers;
pub mod popular;
pub mod ranker;

pub use advisor::{CourseAdvisor, CourseRecommendations};
pub use catalog::{load_course_catalog, CourseCatalog};
pub use popular::CatalogPopularCourses;
pub use ranker::RankOptions;
