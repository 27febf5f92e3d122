//! Search backends that turn a query into an ordered list of candidates.

pub mod searxng;

use crate::error::TrawlError;
use crate::types::{SearchParams, SearchResult};
use async_trait::async_trait;

pub use searxng::SearxngBackend;

/// Source of ranked search results.
///
/// Any failure is fatal to the query: implementations return
/// [`TrawlError::BackendUnavailable`] or [`TrawlError::BackendProtocol`]
/// instead of a partial list.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// At most `params.num_results()` results, in backend rank order.
    async fn search(&self, params: &SearchParams) -> Result<Vec<SearchResult>, TrawlError>;
}
