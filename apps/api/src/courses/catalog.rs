//! Course catalog source.
//!
//! The listing format is a sequence of `<name>_course = [` blocks whose lines
//! hold `['Title', 'URL']` pairs (single or double quotes), each block closed
//! by `]` or `],`. Anything outside a block is ignored. A listing with no
//! non-empty category is treated as absent.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;

/// Listing compiled into the binary, used when no catalog path is configured.
pub const BUNDLED_LISTING: &str = include_str!("../../data/course_catalog.txt");

static BLOCK_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9_]+)_course\s*=\s*\[").expect("block start pattern"));
static COURSE_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\[\s*(?:'([^']*)'|"([^"]*)")\s*,\s*(?:'([^']*)'|"([^"]*)")\s*\]"#)
        .expect("course pair pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseEntry {
    pub title: String,
    pub url: String,
}

/// A catalog course tagged with its category key (e.g. `web_course`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseCandidate {
    pub title: String,
    pub url: String,
    pub category: String,
}

/// Read-only course source keyed by category.
pub trait CourseCatalog: Send + Sync {
    /// Category keys in sorted order.
    fn categories(&self) -> Vec<String>;

    /// Courses of one category in catalog order; empty for unknown keys.
    fn courses(&self, category: &str) -> Vec<CourseCandidate>;

    fn is_empty(&self) -> bool {
        self.categories().is_empty()
    }
}

/// In-memory catalog built from a parsed listing.
#[derive(Debug, Clone, Default)]
pub struct StaticCourseCatalog {
    categories: BTreeMap<String, Vec<CourseEntry>>,
}

impl StaticCourseCatalog {
    pub fn new(categories: BTreeMap<String, Vec<CourseEntry>>) -> Self {
        Self { categories }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a listing; an absent listing yields an empty catalog.
    pub fn from_listing(content: &str) -> Self {
        Self::new(parse_course_listing(content).unwrap_or_default())
    }

    pub fn bundled() -> Self {
        Self::from_listing(BUNDLED_LISTING)
    }

    pub fn course_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }
}

impl CourseCatalog for StaticCourseCatalog {
    fn categories(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }

    fn courses(&self, category: &str) -> Vec<CourseCandidate> {
        self.categories
            .get(category)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| CourseCandidate {
                        title: entry.title.clone(),
                        url: entry.url.clone(),
                        category: category.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Parses a course listing. Returns `None` when no category has any course.
pub fn parse_course_listing(content: &str) -> Option<BTreeMap<String, Vec<CourseEntry>>> {
    let mut data: BTreeMap<String, Vec<CourseEntry>> = BTreeMap::new();
    let mut current: Option<String> = None;

    for raw_line in content.lines() {
        let line = raw_line.trim();

        if let Some(caps) = BLOCK_START.captures(line) {
            let key = format!("{}_course", &caps[1]);
            data.entry(key.clone()).or_default();
            current = Some(key);
            continue;
        }

        let Some(key) = current.as_ref() else {
            continue;
        };

        if line == "]" || line == "]," {
            current = None;
            continue;
        }

        if let Some(caps) = COURSE_PAIR.captures(line) {
            let title = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            let url = caps.get(3).or_else(|| caps.get(4)).map_or("", |m| m.as_str());
            if !title.is_empty() && !url.is_empty() {
                if let Some(entries) = data.get_mut(key) {
                    entries.push(CourseEntry {
                        title: title.to_string(),
                        url: url.to_string(),
                    });
                }
            }
        }
    }

    data.retain(|_, entries| !entries.is_empty());
    if data.is_empty() {
        None
    } else {
        Some(data)
    }
}

/// Loads the catalog from `path`, or the bundled listing when `path` is `None`.
///
/// The read is bounded by `read_timeout`. Any data error degrades to an empty
/// catalog.
pub async fn load_course_catalog(path: Option<&Path>, read_timeout: Duration) -> StaticCourseCatalog {
    let Some(path) = path else {
        let catalog = StaticCourseCatalog::bundled();
        info!("Loaded bundled course catalog ({} courses)", catalog.course_count());
        return catalog;
    };

    match read_course_catalog(path, read_timeout).await {
        Ok(catalog) => {
            info!(
                "Loaded course catalog from {} ({} courses)",
                path.display(),
                catalog.course_count()
            );
            catalog
        }
        Err(e) => {
            warn!("{e}; continuing with an empty course catalog");
            StaticCourseCatalog::empty()
        }
    }
}

async fn read_course_catalog(path: &Path, read_timeout: Duration) -> Result<StaticCourseCatalog, AppError> {
    let content = tokio::time::timeout(read_timeout, tokio::fs::read_to_string(path))
        .await
        .map_err(|_| {
            AppError::Data(format!(
                "course catalog read at {} timed out after {:?}",
                path.display(),
                read_timeout
            ))
        })?
        .map_err(|e| AppError::Data(format!("course catalog at {} unreadable: {e}", path.display())))?;

    let categories = parse_course_listing(&content).ok_or_else(|| {
        AppError::Data(format!("course catalog at {} has no course data", path.display()))
    })?;
    Ok(StaticCourseCatalog::new(categories))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LISTING: &str = r#"
# header noise
web_course = [
    ['React Crash Course [Free]', 'https://youtu.be/Dorf8i6lCuk'],
    ["Django Bootcamp", "https://example.com/django"],
    ['Broken entry without url'],
]

empty_course = [
]
resume_videos = ['https://youtu.be/x']
"#;

    #[test]
    fn test_parse_listing_keeps_pairs_in_order() {
        let data = parse_course_listing(LISTING).unwrap();
        assert_eq!(data.keys().collect::<Vec<_>>(), vec!["web_course"]);
        let web = &data["web_course"];
        assert_eq!(web.len(), 2);
        assert_eq!(web[0].title, "React Crash Course [Free]");
        assert_eq!(web[1].url, "https://example.com/django");
    }

    #[test]
    fn test_parse_listing_without_courses_is_absent() {
        assert!(parse_course_listing("nothing to see").is_none());
        assert!(parse_course_listing("ds_course = [\n]\n").is_none());
    }

    #[test]
    fn test_bundled_catalog_has_core_categories() {
        let catalog = StaticCourseCatalog::bundled();
        for key in ["ds_course", "web_course", "android_course", "ios_course", "uiux_course"] {
            assert!(!catalog.courses(key).is_empty(), "missing {key}");
        }
        assert!(catalog.courses("unknown_course").is_empty());
    }

    #[tokio::test]
    async fn test_load_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LISTING.as_bytes()).unwrap();
        let catalog = load_course_catalog(Some(file.path()), Duration::from_secs(2)).await;
        assert_eq!(catalog.categories(), vec!["web_course"]);
        assert_eq!(catalog.courses("web_course")[0].category, "web_course");
    }

    #[tokio::test]
    async fn test_missing_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let catalog =
            load_course_catalog(Some(&dir.path().join("nope.txt")), Duration::from_secs(2)).await;
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn test_listing_without_courses_is_data_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"resume_videos = []\n").unwrap();
        let err = read_course_catalog(file.path(), Duration::from_secs(2))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "DATA_ERROR");
    }
}
