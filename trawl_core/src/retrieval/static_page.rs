use super::{Retrieval, RetrievalFailure, RetrievalStrategy};
use crate::config::RetrievalConfig;
use crate::dispatch::StrategyKind;
use crate::error::TrawlError;
use crate::extract::HtmlExtractor;
use crate::types::SearchResult;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// Plain HTTP GET followed by an [`HtmlExtractor`].
///
/// The extractor only runs on a 2xx body.
pub struct StaticPageStrategy {
    client: reqwest::Client,
    extractor: Arc<dyn HtmlExtractor>,
    timeout: Duration,
}

impl StaticPageStrategy {
    pub fn new(config: &RetrievalConfig) -> Result<Self, TrawlError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(config.timeout())
            .pool_max_idle_per_host(2)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TrawlError::Config(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            client,
            extractor: config.extractor.build(),
            timeout: config.timeout(),
        })
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn HtmlExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    async fn fetch_html(&self, url: &Url) -> Result<String, RetrievalFailure> {
        let send = self.client.get(url.clone()).send();
        let response = tokio::time::timeout(self.timeout, send)
            .await
            .map_err(|_| RetrievalFailure::Timeout(self.timeout.as_millis() as u64))?
            .map_err(|e| {
                if e.is_timeout() {
                    RetrievalFailure::Timeout(self.timeout.as_millis() as u64)
                } else {
                    RetrievalFailure::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalFailure::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| RetrievalFailure::Http(e.to_string()))
    }
}

#[async_trait]
impl RetrievalStrategy for StaticPageStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Static
    }

    async fn fetch(&self, result: SearchResult) -> Retrieval {
        let start = Instant::now();

        let html = match self.fetch_html(result.url()).await {
            Ok(html) => html,
            Err(reason) => {
                warn!(
                    target: "trawl.retrieval.static",
                    url = %result.url(),
                    reason = %reason,
                    "static fetch failed, keeping snippet"
                );
                return Retrieval::Unchanged { result, reason };
            }
        };

        let text = self.extractor.extract(&html);
        debug!(
            target: "trawl.retrieval.static",
            url = %result.url(),
            extractor = self.extractor.name(),
            bytes = html.len(),
            chars = text.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "static fetch complete"
        );

        if text.trim().is_empty() {
            warn!(
                target: "trawl.retrieval.static",
                url = %result.url(),
                "extractor produced no text, keeping snippet"
            );
            return Retrieval::Unchanged {
                result,
                reason: RetrievalFailure::Empty,
            };
        }

        Retrieval::Enriched(result.with_content(text))
    }
}
