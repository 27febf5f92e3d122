// src/lib.rs
pub mod backend;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod pipeline;
pub mod retrieval;
pub mod types;
pub mod utils;

pub use crate::backend::{SearchBackend, SearxngBackend};
pub use crate::config::TrawlConfig;
pub use crate::dispatch::{Dispatcher, RetrievalRule, StrategyKind, UrlMatcher};
pub use crate::error::TrawlError;
pub use crate::extract::{ExtractorKind, HtmlExtractor, MainContentExtractor, ParagraphExtractor};
pub use crate::normalize::normalize;
pub use crate::pipeline::{ItemFailure, Pipeline, PipelineReport, QueryResults, MAX_BATCH_QUERIES};
pub use crate::retrieval::{
    ContextGuard, PageRenderer, Retrieval, RetrievalFailure, Retriever, Thread, ThreadClient,
    ThreadComment,
};
pub use crate::types::{SearchParams, SearchResult, TimeRange};

#[cfg(feature = "browser")]
pub use crate::retrieval::ChromiumRenderer;

/// Route a result with the given rule table. Pure: no I/O.
pub fn dispatch(dispatcher: &Dispatcher, result: &SearchResult) -> StrategyKind {
    dispatcher.dispatch(result)
}
