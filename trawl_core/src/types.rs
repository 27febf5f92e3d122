//! Data carried through the pipeline.

use crate::error::TrawlError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// A single candidate page.
///
/// `url` is fixed at creation. `content` starts out as the backend snippet and
/// is replaced wholesale by each retrieval or normalization stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    url: Url,
    pub title: String,
    pub content: String,
}

impl SearchResult {
    pub fn new(url: Url, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url,
            title: title.into(),
            content: content.into(),
        }
    }

    /// Parse `url` and build a result, mainly for callers holding plain strings.
    pub fn parse(
        url: &str,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, TrawlError> {
        let url = Url::parse(url)
            .map_err(|e| TrawlError::InvalidInput(format!("invalid url '{}': {}", url, e)))?;
        Ok(Self::new(url, title, content))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Replace the content, returning the updated result.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

/// Recency filter understood by the search backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    Month,
    Year,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Day => "day",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
        }
    }

    /// Lenient parse: anything mentioning "day", "month" or "year" (checked in
    /// that order) selects the range, an empty string selects none.
    pub fn parse_lenient(input: &str) -> Result<Option<Self>, TrawlError> {
        let lowered = input.trim().to_lowercase();
        if lowered.is_empty() {
            return Ok(None);
        }
        for range in [TimeRange::Day, TimeRange::Month, TimeRange::Year] {
            if lowered.contains(range.as_str()) {
                return Ok(Some(range));
            }
        }
        Err(TrawlError::InvalidInput(format!(
            "time range must be one of day, month, year (got '{}')",
            input
        )))
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = TrawlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_lenient(s)?
            .ok_or_else(|| TrawlError::InvalidInput("time range must not be empty".to_string()))
    }
}

pub const DEFAULT_NUM_RESULTS: usize = 10;

/// Parameters for one search invocation.
///
/// Built through [`SearchParams::new`] and the `with_*` builders, which
/// validate as they go; the finished value is only ever borrowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    query: String,
    website: Option<String>,
    num_results: usize,
    time_range: Option<TimeRange>,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Result<Self, TrawlError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(TrawlError::InvalidInput(
                "query must not be empty".to_string(),
            ));
        }
        Ok(Self {
            query,
            website: None,
            num_results: DEFAULT_NUM_RESULTS,
            time_range: None,
        })
    }

    pub fn with_website(mut self, website: Option<String>) -> Self {
        self.website = website
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty());
        self
    }

    pub fn with_num_results(mut self, num_results: usize) -> Result<Self, TrawlError> {
        if num_results == 0 {
            return Err(TrawlError::InvalidInput(
                "num_results must be at least 1".to_string(),
            ));
        }
        self.num_results = num_results;
        Ok(self)
    }

    pub fn with_time_range(mut self, time_range: Option<TimeRange>) -> Self {
        self.time_range = time_range;
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn website(&self) -> Option<&str> {
        self.website.as_deref()
    }

    pub fn num_results(&self) -> usize {
        self.num_results
    }

    pub fn time_range(&self) -> Option<TimeRange> {
        self.time_range
    }

    /// Query text as sent to the backend, with the site filter applied.
    pub fn backend_query(&self) -> String {
        match &self.website {
            Some(site) => format!("{} site:{}", self.query, site),
            None => self.query.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_rejected() {
        assert!(SearchParams::new("").is_err());
        assert!(SearchParams::new("   ").is_err());
    }

    #[test]
    fn test_zero_results_rejected() {
        let params = SearchParams::new("rust").unwrap();
        assert!(params.with_num_results(0).is_err());
    }

    #[test]
    fn test_backend_query_with_site() {
        let params = SearchParams::new("async rust")
            .unwrap()
            .with_website(Some("reddit.com".to_string()));
        assert_eq!(params.backend_query(), "async rust site:reddit.com");

        let params = SearchParams::new("async rust")
            .unwrap()
            .with_website(Some("  ".to_string()));
        assert_eq!(params.website(), None);
        assert_eq!(params.backend_query(), "async rust");
    }

    #[test]
    fn test_time_range_lenient() {
        assert_eq!(
            TimeRange::parse_lenient("past Month").unwrap(),
            Some(TimeRange::Month)
        );
        assert_eq!(TimeRange::parse_lenient("").unwrap(), None);
        assert_eq!("year".parse::<TimeRange>().unwrap(), TimeRange::Year);
        assert!("week".parse::<TimeRange>().is_err());
        assert!("".parse::<TimeRange>().is_err());
    }

    #[test]
    fn test_time_range_serde() {
        let json = serde_json::to_string(&TimeRange::Day).unwrap();
        assert_eq!(json, "\"day\"");
    }

    #[test]
    fn test_with_content_keeps_url() {
        let result = SearchResult::parse("https://example.com/a", "A", "snippet").unwrap();
        let url = result.url().clone();
        let updated = result.with_content("full page");
        assert_eq!(updated.url(), &url);
        assert_eq!(updated.content, "full page");
    }
}
