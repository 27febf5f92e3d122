//! Runtime configuration.
//!
//! Everything has sensible defaults. Values are layered: built-in defaults,
//! then an optional TOML file, then environment variables. The finished
//! [`TrawlConfig`] is read-only and shared by every in-flight request.

use crate::error::TrawlError;
use crate::extract::ExtractorKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

// ============================================================================
// Default Values
// ============================================================================

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

pub const DEFAULT_RESULTS_PER_PAGE: usize = 10;

pub const DEFAULT_MAX_PAGES: usize = 3;

/// Per-request timeout for backend pages and static fetches
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Per-page timeout for headless rendering
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 30;

/// Time given to the DOM to settle after navigation
pub const DEFAULT_SETTLE_MS: u64 = 1500;

pub const DEFAULT_WORD_LIMIT: usize = 5000;

pub const DEFAULT_REDDIT_USER_AGENT: &str = "trawl/0.1.0";

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

// ============================================================================
// Sections
// ============================================================================

/// Search backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub results_per_page: usize,
    pub max_pages: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            results_per_page: DEFAULT_RESULTS_PER_PAGE,
            max_pages: DEFAULT_MAX_PAGES,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Routing rules and per-strategy limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Domains whose pages are served fully in the initial HTML
    pub static_sites: Vec<String>,
    /// Domains handled by the structured thread API
    pub structured_domains: Vec<String>,
    /// URL prefixes handled by the structured thread API
    pub structured_prefixes: Vec<String>,
    /// Text extraction for static pages: `paragraphs` or `main-content`
    pub extractor: ExtractorKind,
    pub timeout_secs: u64,
    pub render_timeout_secs: u64,
    pub settle_ms: u64,
    pub user_agent: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            static_sites: Vec::new(),
            structured_domains: vec!["reddit.com".to_string()],
            structured_prefixes: vec!["https://www.reddit.com".to_string()],
            extractor: ExtractorKind::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            render_timeout_secs: DEFAULT_RENDER_TIMEOUT_SECS,
            settle_ms: DEFAULT_SETTLE_MS,
            user_agent: default_user_agent(),
        }
    }
}

impl RetrievalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Application-only credentials for the Reddit API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub user_agent: String,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            user_agent: DEFAULT_REDDIT_USER_AGENT.to_string(),
        }
    }
}

impl RedditConfig {
    /// Both halves of the credential pair, when present and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some((id, secret))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    pub word_limit: usize,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            word_limit: DEFAULT_WORD_LIMIT,
        }
    }
}

// ============================================================================
// TrawlConfig
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrawlConfig {
    pub backend: BackendConfig,
    pub retrieval: RetrievalConfig,
    pub reddit: RedditConfig,
    pub normalize: NormalizeConfig,
}

impl TrawlConfig {
    /// `~/.config/trawl/config.toml` (Unix) or the platform equivalent.
    pub fn default_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|p| p.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("trawl").join("config.toml")
    }

    pub fn from_toml_str(content: &str) -> Result<Self, TrawlError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, TrawlError> {
        toml::to_string_pretty(self)
            .map_err(|e| TrawlError::Config(format!("failed to serialize config: {}", e)))
    }

    /// Read a TOML file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, TrawlError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                debug!(target: "trawl.config", path = %path.display(), "loaded config file");
                Self::from_toml_str(&content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Defaults, then `path` (or the default path), then the process
    /// environment. The result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self, TrawlError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);
        let mut config = Self::from_file(&path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from an environment lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), TrawlError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TRAWL_SEARXNG_URL") {
            self.backend.base_url = url;
        }
        if let Some(v) = lookup("TRAWL_MAX_PAGES") {
            self.backend.max_pages = parse_env("TRAWL_MAX_PAGES", &v)?;
        }
        if let Some(v) = lookup("TRAWL_TIMEOUT_SECS") {
            let secs = parse_env("TRAWL_TIMEOUT_SECS", &v)?;
            self.backend.timeout_secs = secs;
            self.retrieval.timeout_secs = secs;
        }
        if let Some(v) = lookup("TRAWL_WORD_LIMIT") {
            self.normalize.word_limit = parse_env("TRAWL_WORD_LIMIT", &v)?;
        }
        if let Some(v) = lookup("TRAWL_STATIC_SITES") {
            self.retrieval.static_sites = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(id) = lookup("REDDIT_CLIENT_ID") {
            self.reddit.client_id = Some(id);
        }
        if let Some(secret) = lookup("REDDIT_CLIENT_SECRET") {
            self.reddit.client_secret = Some(secret);
        }
        if let Some(ua) = lookup("REDDIT_USER_AGENT") {
            self.reddit.user_agent = ua;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), TrawlError> {
        Url::parse(&self.backend.base_url).map_err(|e| {
            TrawlError::Config(format!(
                "backend.base_url '{}' is not a valid URL: {}",
                self.backend.base_url, e
            ))
        })?;
        if self.backend.results_per_page == 0 {
            return Err(TrawlError::Config(
                "backend.results_per_page must be at least 1".to_string(),
            ));
        }
        if self.backend.max_pages == 0 {
            return Err(TrawlError::Config(
                "backend.max_pages must be at least 1".to_string(),
            ));
        }
        if self.backend.timeout_secs == 0
            || self.retrieval.timeout_secs == 0
            || self.retrieval.render_timeout_secs == 0
        {
            return Err(TrawlError::Config("timeouts must be at least 1s".to_string()));
        }
        if self.normalize.word_limit == 0 {
            return Err(TrawlError::Config(
                "normalize.word_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, TrawlError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| TrawlError::Config(format!("{}='{}': {}", key, value, e)))
}
