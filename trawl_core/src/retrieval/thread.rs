use super::{Retrieval, RetrievalFailure, RetrievalStrategy};
use crate::config::{RedditConfig, RetrievalConfig};
use crate::dispatch::StrategyKind;
use crate::error::TrawlError;
use crate::types::SearchResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadComment {
    pub score: i64,
    pub body: String,
}

/// A discussion thread as returned by a structured API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub title: String,
    pub score: i64,
    pub body: String,
    /// Top-level comments in API order
    pub comments: Vec<ThreadComment>,
}

/// Render a thread as the text that replaces a result's snippet.
///
/// ```rust
/// use trawl_core::retrieval::{format_thread, Thread, ThreadComment};
///
/// let thread = Thread {
///     title: "T".into(),
///     score: 5,
///     body: "B".into(),
///     comments: vec![ThreadComment { score: 2, body: "C1".into() }],
/// };
/// assert_eq!(
///     format_thread(&thread),
///     "Title: T (Upvotes:5)\nContent: B\nComments:\n0. (Upvotes:2) C1\n"
/// );
/// ```
pub fn format_thread(thread: &Thread) -> String {
    let mut out = format!(
        "Title: {} (Upvotes:{})\nContent: {}\nComments:\n",
        thread.title, thread.score, thread.body
    );
    for (i, comment) in thread.comments.iter().enumerate() {
        // Writing to a String cannot fail
        let _ = writeln!(out, "{}. (Upvotes:{}) {}", i, comment.score, comment.body);
    }
    out
}

/// Read access to a thread API.
///
/// Implementations return [`TrawlError::NotConfigured`] when credentials are
/// missing, so callers can tell that apart from a failed request.
#[async_trait]
pub trait ThreadClient: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_thread(&self, url: &Url) -> Result<Thread, TrawlError>;
}

/// Structured-API strategy.
pub struct ThreadStrategy {
    client: Option<Arc<dyn ThreadClient>>,
    timeout: Duration,
}

impl ThreadStrategy {
    pub fn new(client: Option<Arc<dyn ThreadClient>>, config: &RetrievalConfig) -> Self {
        Self {
            client,
            timeout: config.timeout(),
        }
    }

    pub fn with_client(mut self, client: Arc<dyn ThreadClient>) -> Self {
        self.client = Some(client);
        self
    }

    async fn load(&self, url: &Url) -> Result<Thread, RetrievalFailure> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| RetrievalFailure::NotConfigured("thread client".to_string()))?;

        let thread = tokio::time::timeout(self.timeout, client.fetch_thread(url))
            .await
            .map_err(|_| RetrievalFailure::Timeout(self.timeout.as_millis() as u64))??;
        Ok(thread)
    }
}

#[async_trait]
impl RetrievalStrategy for ThreadStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StructuredApi
    }

    async fn fetch(&self, result: SearchResult) -> Retrieval {
        let start = Instant::now();
        match self.load(result.url()).await {
            Ok(thread) => {
                debug!(
                    target: "trawl.retrieval.thread",
                    url = %result.url(),
                    comments = thread.comments.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "thread fetched"
                );
                let content = format_thread(&thread);
                Retrieval::Enriched(result.with_content(content))
            }
            Err(reason) => {
                warn!(
                    target: "trawl.retrieval.thread",
                    url = %result.url(),
                    reason = %reason,
                    "thread fetch failed, keeping snippet"
                );
                Retrieval::Unchanged { result, reason }
            }
        }
    }
}

// ============================================================================
// Reddit
// ============================================================================

const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const REDDIT_API_BASE: &str = "https://oauth.reddit.com/";
const REDDIT_HOSTS: &[&str] = &[
    "reddit.com",
    "www.reddit.com",
    "old.reddit.com",
    "new.reddit.com",
    "np.reddit.com",
];
/// Refresh the token this long before Reddit says it expires
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Submission id from a Reddit thread URL.
///
/// Accepts `/r/<sub>/comments/<id>` on the usual hosts and `redd.it/<id>`.
pub fn extract_thread_id(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();

    let id = if host == "redd.it" {
        segments.first().copied()
    } else if REDDIT_HOSTS.contains(&host.as_str()) {
        match segments.as_slice() {
            ["r", _, "comments", id, ..] => Some(*id),
            ["comments", id, ..] => Some(*id),
            _ => None,
        }
    } else {
        None
    };
    let id = id?;

    id.chars()
        .all(|c| c.is_ascii_alphanumeric())
        .then(|| id.to_string())
}

/// Build a [`Thread`] from the two-listing body of `/comments/<id>`.
///
/// Only `t1` children of the second listing are kept; `more` placeholders
/// and anything else are skipped.
pub fn parse_thread_listing(value: &Value) -> Result<Thread, TrawlError> {
    let post = value
        .get(0)
        .and_then(|listing| listing["data"]["children"].get(0))
        .map(|child| &child["data"])
        .ok_or_else(|| TrawlError::SerdeJson(serde::de::Error::custom("missing submission")))?;

    let comments = value
        .get(1)
        .and_then(|listing| listing["data"]["children"].as_array())
        .map(|children| {
            children
                .iter()
                .filter(|child| child["kind"].as_str() == Some("t1"))
                .map(|child| ThreadComment {
                    score: score_of(&child["data"]["score"]),
                    body: child["data"]["body"].as_str().unwrap_or_default().to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(Thread {
        title: post["title"].as_str().unwrap_or_default().to_string(),
        score: score_of(&post["score"]),
        body: post["selftext"].as_str().unwrap_or_default().to_string(),
        comments,
    })
}

fn score_of(value: &Value) -> i64 {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .unwrap_or(0)
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Application-only Reddit API client.
///
/// Uses the client-credentials grant and caches the bearer token until
/// shortly before it expires.
pub struct RedditClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    token_url: Url,
    api_base: Url,
    token: RwLock<Option<CachedToken>>,
}

impl RedditClient {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, TrawlError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| TrawlError::Config(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            http,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: parse_endpoint(REDDIT_TOKEN_URL)?,
            api_base: parse_endpoint(REDDIT_API_BASE)?,
            token: RwLock::new(None),
        })
    }

    /// `None` when no credentials are configured.
    pub fn from_config(config: &RedditConfig, timeout: Duration) -> Result<Option<Self>, TrawlError> {
        match config.credentials() {
            Some((id, secret)) => Ok(Some(Self::new(id, secret, &config.user_agent, timeout)?)),
            None => Ok(None),
        }
    }

    /// Point the client at different token and API endpoints.
    pub fn with_endpoints(mut self, token_url: Url, api_base: Url) -> Self {
        self.token_url = token_url;
        self.api_base = api_base;
        self
    }

    async fn access_token(&self) -> Result<String, TrawlError> {
        if let Some(token) = self.token.read().await.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        let mut slot = self.token.write().await;
        // Another task may have refreshed while we waited for the lock
        if let Some(token) = slot.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        let response = self
            .http
            .post(self.token_url.clone())
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TrawlError::NotConfigured(format!(
                "reddit rejected the client credentials (HTTP {})",
                status
            )));
        }
        let token: TokenResponse = response.json().await?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *slot = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        debug!(target: "trawl.retrieval.thread", expires_in = token.expires_in, "reddit token refreshed");
        Ok(token.access_token)
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, TrawlError> {
    Url::parse(raw).map_err(|e| TrawlError::Config(format!("invalid endpoint '{}': {}", raw, e)))
}

#[async_trait]
impl ThreadClient for RedditClient {
    fn name(&self) -> &'static str {
        "reddit"
    }

    async fn fetch_thread(&self, url: &Url) -> Result<Thread, TrawlError> {
        let id = extract_thread_id(url).ok_or_else(|| {
            TrawlError::InvalidInput(format!("not a reddit thread url: {}", url))
        })?;
        let token = self.access_token().await?;

        let mut endpoint = self
            .api_base
            .join(&format!("comments/{}", id))
            .map_err(|e| TrawlError::InvalidInput(e.to_string()))?;
        endpoint.query_pairs_mut().append_pair("raw_json", "1");

        let response = self.http.get(endpoint).bearer_auth(token).send().await?;
        let response = response.error_for_status()?;
        let value: Value = response.json().await?;
        parse_thread_listing(&value)
    }
}
