use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable is optional; invalid numeric values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Generator credentials. `None` selects the disabled provider.
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: String,
    pub llm_timeout_secs: u64,
    /// Course listing file. `None` uses the bundled listing.
    pub course_catalog_path: Option<PathBuf>,
    pub catalog_read_timeout_ms: u64,
    /// `0` disables the resume-analysis cache.
    pub analysis_cache_ttl_secs: u64,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            anthropic_base_url: "https://api.anthropic.com".to_string(),
            llm_timeout_secs: 60,
            course_catalog_path: None,
            catalog_read_timeout_ms: 2000,
            analysis_cache_ttl_secs: 600,
            max_upload_bytes: 10 * 1024 * 1024,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        Ok(Config {
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            anthropic_base_url: optional_env("ANTHROPIC_BASE_URL")
                .unwrap_or(defaults.anthropic_base_url),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", defaults.llm_timeout_secs)?,
            course_catalog_path: optional_env("COURSE_CATALOG_PATH").map(PathBuf::from),
            catalog_read_timeout_ms: parse_env(
                "CATALOG_READ_TIMEOUT_MS",
                defaults.catalog_read_timeout_ms,
            )?,
            analysis_cache_ttl_secs: parse_env(
                "ANALYSIS_CACHE_TTL_SECS",
                defaults.analysis_cache_ttl_secs,
            )?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            port: parse_env("PORT", defaults.port)?,
            rust_log: optional_env("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}
