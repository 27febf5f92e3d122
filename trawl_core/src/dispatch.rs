//! URL router that picks a retrieval strategy for each search result.
//!
//! Rules are checked highest priority first. Structured-API rules outrank the
//! static allow-list, and anything left unmatched is rendered dynamically.
//!
//! # Example
//!
//! ```rust
//! use trawl_core::dispatch::{Dispatcher, RetrievalRule, StrategyKind};
//! use url::Url;
//!
//! let dispatcher = Dispatcher::new(vec![
//!     RetrievalRule::static_site("example.com"),
//!     RetrievalRule::structured_domain("social.example"),
//! ]);
//!
//! let url = Url::parse("https://social.example/thread/1").unwrap();
//! assert_eq!(dispatcher.dispatch_url(&url), StrategyKind::StructuredApi);
//! ```

use crate::config::RetrievalConfig;
use crate::types::SearchResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

pub const STRUCTURED_PRIORITY: u32 = 300;
pub const STATIC_PRIORITY: u32 = 200;

/// The closed set of retrieval strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    StructuredApi,
    Static,
    Dynamic,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::StructuredApi => "structured-api",
            StrategyKind::Static => "static",
            StrategyKind::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// URL predicate of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum UrlMatcher {
    /// Host equals the domain or is a subdomain of it
    Domain(String),
    /// Full URL starts with the prefix
    Prefix(String),
}

impl UrlMatcher {
    pub fn matches(&self, url: &Url) -> bool {
        match self {
            UrlMatcher::Domain(domain) => {
                let Some(host) = url.host_str() else {
                    return false;
                };
                let host = host.to_ascii_lowercase();
                let domain = domain.trim().trim_start_matches('.').to_ascii_lowercase();
                if domain.is_empty() {
                    return false;
                }
                host == domain
                    || host
                        .strip_suffix(&domain)
                        .is_some_and(|rest| rest.ends_with('.'))
            }
            UrlMatcher::Prefix(prefix) => !prefix.is_empty() && url.as_str().starts_with(prefix),
        }
    }
}

impl fmt::Display for UrlMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlMatcher::Domain(d) => write!(f, "domain {}", d),
            UrlMatcher::Prefix(p) => write!(f, "prefix {}", p),
        }
    }
}

/// One routing rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalRule {
    pub id: String,
    pub matcher: UrlMatcher,
    pub strategy: StrategyKind,
    /// Higher is checked first
    pub priority: u32,
    pub description: String,
}

impl RetrievalRule {
    pub fn structured_domain(domain: impl Into<String>) -> Self {
        let domain = domain.into();
        Self {
            id: format!("structured_domain:{}", domain),
            description: format!("Thread API for {}", domain),
            matcher: UrlMatcher::Domain(domain),
            strategy: StrategyKind::StructuredApi,
            priority: STRUCTURED_PRIORITY,
        }
    }

    pub fn structured_prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            id: format!("structured_prefix:{}", prefix),
            description: format!("Thread API for URLs under {}", prefix),
            matcher: UrlMatcher::Prefix(prefix),
            strategy: StrategyKind::StructuredApi,
            priority: STRUCTURED_PRIORITY,
        }
    }

    pub fn static_site(domain: impl Into<String>) -> Self {
        let domain = domain.into();
        Self {
            id: format!("static_site:{}", domain),
            description: format!("Plain HTTP fetch for {}", domain),
            matcher: UrlMatcher::Domain(domain),
            strategy: StrategyKind::Static,
            priority: STATIC_PRIORITY,
        }
    }
}

/// Outcome of routing a single URL, with the rule that decided it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub url: String,
    pub strategy: StrategyKind,
    /// `None` when the dynamic fallback applied
    pub rule: Option<String>,
}

/// Rule table; immutable after construction.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    rules: Vec<RetrievalRule>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::from_config(&RetrievalConfig::default())
    }
}

impl Dispatcher {
    pub fn new(mut rules: Vec<RetrievalRule>) -> Self {
        // Stable sort keeps insertion order within a priority band
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self { rules }
    }

    pub fn from_config(config: &RetrievalConfig) -> Self {
        let mut rules = Vec::new();
        rules.extend(
            config
                .structured_domains
                .iter()
                .map(RetrievalRule::structured_domain),
        );
        rules.extend(
            config
                .structured_prefixes
                .iter()
                .map(RetrievalRule::structured_prefix),
        );
        rules.extend(config.static_sites.iter().map(RetrievalRule::static_site));
        Self::new(rules)
    }

    pub fn dispatch(&self, result: &SearchResult) -> StrategyKind {
        self.dispatch_url(result.url())
    }

    pub fn dispatch_url(&self, url: &Url) -> StrategyKind {
        self.matching_rule(url)
            .map(|rule| rule.strategy)
            .unwrap_or(StrategyKind::Dynamic)
    }

    pub fn explain(&self, url: &Url) -> RouteDecision {
        let rule = self.matching_rule(url);
        RouteDecision {
            url: url.to_string(),
            strategy: rule.map(|r| r.strategy).unwrap_or(StrategyKind::Dynamic),
            rule: rule.map(|r| r.id.clone()),
        }
    }

    pub fn list_rules(&self) -> &[RetrievalRule] {
        &self.rules
    }

    fn matching_rule(&self, url: &Url) -> Option<&RetrievalRule> {
        self.rules.iter().find(|rule| rule.matcher.matches(url))
    }
}
