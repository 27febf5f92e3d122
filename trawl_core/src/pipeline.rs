//! Query orchestration: search, dispatch, retrieve, normalize.
//!
//! Per-item work runs concurrently but results are collected by position, so
//! output order always equals the backend's order.

use crate::backend::{SearchBackend, SearxngBackend};
use crate::config::TrawlConfig;
use crate::dispatch::{Dispatcher, StrategyKind};
use crate::error::TrawlError;
use crate::normalize::normalize;
use crate::retrieval::{PageRenderer, Retrieval, Retriever};
use crate::types::{SearchParams, SearchResult};
use futures::future::{join_all, try_join_all};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Most queries accepted by [`Pipeline::run_many`].
pub const MAX_BATCH_QUERIES: usize = 3;

/// An item whose retrieval failed and which kept its snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub url: String,
    pub strategy: StrategyKind,
    pub code: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub failures: Vec<ItemFailure>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResults {
    pub query: String,
    pub results: Vec<SearchResult>,
}

/// One processed item: its route, and the normalized outcome.
#[derive(Debug, Clone)]
pub struct ProcessedItem {
    pub strategy: StrategyKind,
    pub retrieval: Retrieval,
}

impl ProcessedItem {
    pub fn failure(&self) -> Option<ItemFailure> {
        self.retrieval.failure().map(|reason| ItemFailure {
            url: self.retrieval.result().url().to_string(),
            strategy: self.strategy,
            code: reason.code_str().to_string(),
            reason: reason.to_string(),
        })
    }
}

pub struct Pipeline {
    backend: Arc<dyn SearchBackend>,
    dispatcher: Dispatcher,
    retriever: Retriever,
    word_limit: usize,
}

impl Pipeline {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        dispatcher: Dispatcher,
        retriever: Retriever,
        word_limit: usize,
    ) -> Self {
        Self {
            backend,
            dispatcher,
            retriever,
            word_limit,
        }
    }

    /// SearXNG backend, config-driven routes, static fetching and (when
    /// credentials exist) the Reddit client. Attach a renderer with
    /// [`Pipeline::with_renderer`].
    pub fn from_config(config: &TrawlConfig) -> Result<Self, TrawlError> {
        Ok(Self::new(
            Arc::new(SearxngBackend::new(&config.backend)?),
            Dispatcher::from_config(&config.retrieval),
            Retriever::from_config(&config.retrieval, &config.reddit)?,
            config.normalize.word_limit,
        ))
    }

    pub fn with_retriever(mut self, retriever: Retriever) -> Self {
        self.retriever = retriever;
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.retriever = self.retriever.with_renderer(renderer);
        self
    }

    pub fn with_word_limit(mut self, word_limit: usize) -> Self {
        self.word_limit = word_limit;
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn word_limit(&self) -> usize {
        self.word_limit
    }

    /// Search, then retrieve and normalize every result.
    ///
    /// Fails only when the backend fails.
    pub async fn run(&self, params: &SearchParams) -> Result<Vec<SearchResult>, TrawlError> {
        Ok(self.run_with_report(params).await?.results)
    }

    pub async fn search_and_retrieve(
        &self,
        params: &SearchParams,
    ) -> Result<Vec<SearchResult>, TrawlError> {
        self.run(params).await
    }

    /// Like [`Pipeline::run`], also reporting which items kept their snippet.
    pub async fn run_with_report(&self, params: &SearchParams) -> Result<PipelineReport, TrawlError> {
        let start = Instant::now();
        let candidates = self.backend.search(params).await?;
        debug!(
            target: "trawl.pipeline",
            backend = self.backend.name(),
            query = params.query(),
            candidates = candidates.len(),
            "search complete"
        );

        let processed = join_all(candidates.into_iter().map(|result| self.process(result))).await;

        let failures: Vec<ItemFailure> = processed.iter().filter_map(ProcessedItem::failure).collect();
        let results: Vec<SearchResult> = processed
            .into_iter()
            .map(|item| item.retrieval.into_result())
            .collect();

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            target: "trawl.pipeline",
            query = params.query(),
            results = results.len(),
            failed = failures.len(),
            duration_ms,
            "query complete"
        );

        Ok(PipelineReport {
            query: params.query().to_string(),
            results,
            failures,
            duration_ms,
        })
    }

    /// Run up to [`MAX_BATCH_QUERIES`] queries at once, in input order.
    pub async fn run_many(&self, batch: &[SearchParams]) -> Result<Vec<QueryResults>, TrawlError> {
        if batch.is_empty() {
            return Err(TrawlError::InvalidInput("at least one query is required".to_string()));
        }
        if batch.len() > MAX_BATCH_QUERIES {
            return Err(TrawlError::InvalidInput(format!(
                "at most {} queries per batch (got {})",
                MAX_BATCH_QUERIES,
                batch.len()
            )));
        }

        try_join_all(batch.iter().map(|params| async move {
            let results = self.run(params).await?;
            Ok::<_, TrawlError>(QueryResults {
                query: params.query().to_string(),
                results,
            })
        }))
        .await
    }

    /// Route, retrieve and normalize a single result.
    pub async fn process(&self, result: SearchResult) -> ProcessedItem {
        let strategy = self.dispatcher.dispatch(&result);
        let retrieval = match self.retriever.fetch(strategy, result).await {
            Retrieval::Enriched(result) => Retrieval::Enriched(self.normalized(result)),
            Retrieval::Unchanged { result, reason } => Retrieval::Unchanged {
                result: self.normalized(result),
                reason,
            },
        };
        ProcessedItem {
            strategy,
            retrieval,
        }
    }

    fn normalized(&self, result: SearchResult) -> SearchResult {
        let content = normalize(&result.content, self.word_limit);
        result.with_content(content)
    }
}
