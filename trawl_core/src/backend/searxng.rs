use super::SearchBackend;
use crate::config::BackendConfig;
use crate::error::TrawlError;
use crate::types::{SearchParams, SearchResult, TimeRange};
use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

#[derive(Debug, Deserialize)]
struct SearxngResponse {
    results: Vec<SearxngRecord>,
}

#[derive(Debug, Deserialize)]
struct SearxngRecord {
    url: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

/// Adapter for a SearXNG instance's JSON API.
///
/// All configured pages are requested at once and stitched back together in
/// page order, so the output order never depends on which page answered first.
pub struct SearxngBackend {
    client: reqwest::Client,
    search_url: Url,
    results_per_page: usize,
    max_pages: usize,
    timeout: Duration,
}

impl SearxngBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, TrawlError> {
        let mut base = Url::parse(&config.base_url).map_err(|e| {
            TrawlError::Config(format!("invalid backend url '{}': {}", config.base_url, e))
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let search_url = base
            .join("search")
            .map_err(|e| TrawlError::Config(format!("invalid backend url: {}", e)))?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TrawlError::Config(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            client,
            search_url,
            results_per_page: config.results_per_page,
            max_pages: config.max_pages,
            timeout: config.timeout(),
        })
    }

    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    async fn fetch_page(
        &self,
        query: &str,
        time_range: Option<TimeRange>,
        pageno: usize,
    ) -> Result<Vec<SearchResult>, TrawlError> {
        let pageno = pageno.to_string();
        let mut form: Vec<(&str, &str)> = vec![
            ("q", query),
            ("format", "json"),
            ("pageno", pageno.as_str()),
            ("safesearch", "0"),
            ("language", "auto"),
            ("category_general", "1"),
        ];
        if let Some(range) = time_range {
            form.push(("time_range", range.as_str()));
        }

        let request = self.client.post(self.search_url.clone()).form(&form).send();
        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| {
                TrawlError::BackendUnavailable(format!(
                    "page {} timed out after {}s",
                    pageno,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| TrawlError::BackendUnavailable(format!("page {}: {}", pageno, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrawlError::BackendUnavailable(format!(
                "page {} returned HTTP {}",
                pageno, status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TrawlError::BackendUnavailable(format!("page {}: {}", pageno, e)))?;
        let parsed: SearxngResponse = serde_json::from_str(&body).map_err(|e| {
            TrawlError::BackendProtocol(format!("page {}: unexpected response shape: {}", pageno, e))
        })?;

        parsed
            .results
            .into_iter()
            .take(self.results_per_page)
            .map(|record| -> Result<SearchResult, TrawlError> {
                let url = Url::parse(&record.url).map_err(|e| {
                    TrawlError::BackendProtocol(format!(
                        "page {}: invalid result url '{}': {}",
                        pageno, record.url, e
                    ))
                })?;
                Ok(SearchResult::new(
                    url,
                    record.title.unwrap_or_default(),
                    record.content.unwrap_or_default(),
                ))
            })
            .collect()
    }
}

#[async_trait]
impl SearchBackend for SearxngBackend {
    fn name(&self) -> &'static str {
        "searxng"
    }

    async fn search(&self, params: &SearchParams) -> Result<Vec<SearchResult>, TrawlError> {
        let start = Instant::now();
        let query = params.backend_query();

        let pages = join_all(
            (1..=self.max_pages).map(|pageno| self.fetch_page(&query, params.time_range(), pageno)),
        )
        .await;

        // join_all yields in input order, so this is page order
        let mut results = Vec::new();
        for page in pages {
            results.extend(page?);
        }
        results.truncate(params.num_results());

        debug!(
            target: "trawl.backend",
            query = %query,
            pages = self.max_pages,
            results = results.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "searxng search complete"
        );
        Ok(results)
    }
}
