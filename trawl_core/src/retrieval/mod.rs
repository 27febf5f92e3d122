//! Retrieval strategies that replace a result's snippet with full content.
//!
//! Strategies never return `Err`. A failed fetch comes back as
//! [`Retrieval::Unchanged`] carrying the untouched input and the reason, so one
//! broken page cannot sink the batch.

pub mod dynamic_page;
pub mod static_page;
pub mod thread;

use crate::config::{RedditConfig, RetrievalConfig};
use crate::dispatch::StrategyKind;
use crate::error::TrawlError;
use crate::extract::HtmlExtractor;
use crate::types::SearchResult;
use async_trait::async_trait;
use std::sync::Arc;

pub use dynamic_page::{ContextGuard, DynamicPageStrategy, PageRenderer};
pub use static_page::StaticPageStrategy;
pub use thread::{format_thread, RedditClient, Thread, ThreadClient, ThreadComment, ThreadStrategy};

#[cfg(feature = "browser")]
pub use dynamic_page::ChromiumRenderer;

/// Why a strategy left a result unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetrievalFailure {
    #[error("{0} is not configured")]
    NotConfigured(String),

    #[error("timed out after {0}ms")]
    Timeout(u64),

    #[error("request failed: {0}")]
    Http(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("render failed: {0}")]
    Render(String),

    #[error("api error: {0}")]
    Api(String),

    #[error("no content extracted")]
    Empty,
}

impl RetrievalFailure {
    pub fn code_str(&self) -> &'static str {
        match self {
            RetrievalFailure::NotConfigured(_) => "not_configured",
            RetrievalFailure::Timeout(_) => "timeout",
            RetrievalFailure::Http(_) => "http_error",
            RetrievalFailure::Status(_) => "bad_status",
            RetrievalFailure::Render(_) => "render_error",
            RetrievalFailure::Api(_) => "api_error",
            RetrievalFailure::Empty => "empty",
        }
    }
}

impl From<TrawlError> for RetrievalFailure {
    fn from(err: TrawlError) -> Self {
        match err {
            TrawlError::NotConfigured(what) => RetrievalFailure::NotConfigured(what),
            TrawlError::HttpRequest(e) => RetrievalFailure::Http(e.to_string()),
            other => RetrievalFailure::Api(other.to_string()),
        }
    }
}

/// Outcome of one strategy call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retrieval {
    Enriched(SearchResult),
    Unchanged {
        result: SearchResult,
        reason: RetrievalFailure,
    },
}

impl Retrieval {
    pub fn result(&self) -> &SearchResult {
        match self {
            Retrieval::Enriched(result) | Retrieval::Unchanged { result, .. } => result,
        }
    }

    pub fn into_result(self) -> SearchResult {
        match self {
            Retrieval::Enriched(result) | Retrieval::Unchanged { result, .. } => result,
        }
    }

    pub fn failure(&self) -> Option<&RetrievalFailure> {
        match self {
            Retrieval::Enriched(_) => None,
            Retrieval::Unchanged { reason, .. } => Some(reason),
        }
    }

    pub fn is_enriched(&self) -> bool {
        matches!(self, Retrieval::Enriched(_))
    }
}

/// Common capability of every retrieval strategy.
#[async_trait]
pub trait RetrievalStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    async fn fetch(&self, result: SearchResult) -> Retrieval;
}

/// Holds one instance of each strategy, shared by all in-flight fetches.
pub struct Retriever {
    static_page: StaticPageStrategy,
    dynamic_page: DynamicPageStrategy,
    thread: ThreadStrategy,
}

impl Retriever {
    /// Static fetching only; the renderer and thread client start unset.
    pub fn new(config: &RetrievalConfig) -> Result<Self, TrawlError> {
        Ok(Self {
            static_page: StaticPageStrategy::new(config)?,
            dynamic_page: DynamicPageStrategy::new(None, config),
            thread: ThreadStrategy::new(None, config),
        })
    }

    /// Like [`Retriever::new`], plus a Reddit client when credentials exist.
    pub fn from_config(
        retrieval: &RetrievalConfig,
        reddit: &RedditConfig,
    ) -> Result<Self, TrawlError> {
        let retriever = Self::new(retrieval)?;
        match RedditClient::from_config(reddit, retrieval.timeout())? {
            Some(client) => Ok(retriever.with_thread_client(Arc::new(client))),
            None => Ok(retriever),
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn HtmlExtractor>) -> Self {
        self.static_page = self.static_page.with_extractor(extractor);
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.dynamic_page = self.dynamic_page.with_renderer(renderer);
        self
    }

    pub fn with_thread_client(mut self, client: Arc<dyn ThreadClient>) -> Self {
        self.thread = self.thread.with_client(client);
        self
    }

    pub fn strategy(&self, kind: StrategyKind) -> &dyn RetrievalStrategy {
        match kind {
            StrategyKind::StructuredApi => &self.thread,
            StrategyKind::Static => &self.static_page,
            StrategyKind::Dynamic => &self.dynamic_page,
        }
    }

    pub async fn fetch(&self, kind: StrategyKind, result: SearchResult) -> Retrieval {
        self.strategy(kind).fetch(result).await
    }
}
