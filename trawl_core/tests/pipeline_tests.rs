use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use trawl_core::config::RetrievalConfig;
use trawl_core::dispatch::{Dispatcher, RetrievalRule, StrategyKind};
use trawl_core::retrieval::{PageRenderer, RetrievalFailure, Retriever, Thread, ThreadClient, ThreadComment};
use trawl_core::{
    Pipeline, SearchBackend, SearchParams, SearchResult, TrawlConfig, TrawlError, MAX_BATCH_QUERIES,
};
use url::Url;

/// Returns a fixed list, truncated like a real backend.
struct FixedBackend {
    results: Vec<SearchResult>,
    calls: AtomicUsize,
}

impl FixedBackend {
    fn new(urls: &[&str]) -> Self {
        let results = urls
            .iter()
            .enumerate()
            .map(|(i, u)| SearchResult::parse(u, format!("Result {}", i), format!("snippet   {}  😀", i)).unwrap())
            .collect();
        Self {
            results,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SearchBackend for FixedBackend {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn search(&self, params: &SearchParams) -> Result<Vec<SearchResult>, TrawlError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.results.iter().take(params.num_results()).cloned().collect())
    }
}

struct DownBackend;

#[async_trait]
impl SearchBackend for DownBackend {
    fn name(&self) -> &'static str {
        "down"
    }

    async fn search(&self, _params: &SearchParams) -> Result<Vec<SearchResult>, TrawlError> {
        Err(TrawlError::BackendUnavailable("connection refused".to_string()))
    }
}

/// Renders each URL after a per-URL delay; URLs containing "broken" fail.
struct ScriptedRenderer {
    delays_ms: HashMap<String, u64>,
    calls: AtomicUsize,
}

#[async_trait]
impl PageRenderer for ScriptedRenderer {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn render(&self, url: &Url) -> Result<String, RetrievalFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays_ms.get(url.as_str()).copied().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        if url.as_str().contains("broken") {
            return Err(RetrievalFailure::Render("navigation failed".to_string()));
        }
        Ok(format!(
            "<html><body><p>rendered {} with plenty of words to truncate later</p></body></html>",
            url.path()
        ))
    }
}

struct FakeThreads;

#[async_trait]
impl ThreadClient for FakeThreads {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch_thread(&self, _url: &Url) -> Result<Thread, TrawlError> {
        Ok(Thread {
            title: "T".to_string(),
            score: 5,
            body: "B".to_string(),
            comments: vec![
                ThreadComment {
                    score: 2,
                    body: "C1".to_string(),
                },
                ThreadComment {
                    score: 1,
                    body: "C2".to_string(),
                },
            ],
        })
    }
}

fn renderer(delays: &[(&str, u64)]) -> Arc<ScriptedRenderer> {
    Arc::new(ScriptedRenderer {
        delays_ms: delays.iter().map(|(u, d)| (u.to_string(), *d)).collect(),
        calls: AtomicUsize::new(0),
    })
}

fn pipeline(backend: Arc<dyn SearchBackend>, renderer: Arc<ScriptedRenderer>, word_limit: usize) -> Pipeline {
    let config = RetrievalConfig::default();
    let dispatcher = Dispatcher::new(vec![RetrievalRule::structured_domain("social.example")]);
    let retriever = Retriever::new(&config)
        .unwrap()
        .with_renderer(renderer)
        .with_thread_client(Arc::new(FakeThreads));
    Pipeline::new(backend, dispatcher, retriever, word_limit)
}

#[tokio::test]
async fn test_output_order_matches_backend_order() {
    let urls = [
        "https://a.example.org/first",
        "https://b.example.org/second",
        "https://c.example.org/third",
        "https://d.example.org/fourth",
    ];
    // Earlier items finish last
    let renderer = renderer(&[
        ("https://a.example.org/first", 300),
        ("https://b.example.org/second", 200),
        ("https://c.example.org/third", 100),
    ]);
    let backend = Arc::new(FixedBackend::new(&urls));
    let pipeline = pipeline(backend.clone(), renderer.clone(), 100);

    let params = SearchParams::new("order").unwrap();
    let results = pipeline.search_and_retrieve(&params).await.unwrap();

    let got: Vec<&str> = results.iter().map(|r| r.url().as_str()).collect();
    assert_eq!(got, urls);
    assert!(results[0].content.starts_with("rendered /first"));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_failures_keep_normalized_snippet() {
    let urls = [
        "https://ok.example.org/page",
        "https://broken.example.org/page",
        "https://social.example/thread/1",
    ];
    let pipeline = pipeline(Arc::new(FixedBackend::new(&urls)), renderer(&[]), 100);

    let params = SearchParams::new("mixed").unwrap();
    let report = pipeline.run_with_report(&params).await.unwrap();

    assert_eq!(report.results.len(), 3);
    assert_eq!(report.results[1].content, "snippet 1");
    assert_eq!(report.results[1].title, "Result 1");
    assert_eq!(
        report.results[2].content,
        "Title: T (Upvotes:5) Content: B Comments: 0. (Upvotes:2) C1 1. (Upvotes:1) C2"
    );

    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.url, "https://broken.example.org/page");
    assert_eq!(failure.strategy, StrategyKind::Dynamic);
    assert_eq!(failure.code, "render_error");
    assert_eq!(report.query, "mixed");
}

#[tokio::test]
async fn test_length_bounded_by_num_results_and_words_by_limit() {
    let urls = [
        "https://a.example.org/1",
        "https://b.example.org/2",
        "https://c.example.org/3",
        "https://d.example.org/4",
        "https://e.example.org/5",
    ];
    let pipeline = pipeline(Arc::new(FixedBackend::new(&urls)), renderer(&[]), 3);

    let params = SearchParams::new("bounded").unwrap().with_num_results(2).unwrap();
    let results = pipeline.run(&params).await.unwrap();

    assert!(results.len() <= 2);
    for result in &results {
        assert_eq!(result.content.split_whitespace().count(), 3);
    }
    assert_eq!(results[0].content, "rendered /1 with");
}

#[tokio::test]
async fn test_backend_failure_is_terminal() {
    let pipeline = pipeline(Arc::new(DownBackend), renderer(&[]), 100);
    let params = SearchParams::new("anything").unwrap();
    let err = pipeline.run(&params).await.unwrap_err();
    assert!(matches!(err, TrawlError::BackendUnavailable(_)));
}

#[tokio::test]
async fn test_run_many_keeps_query_order() {
    let pipeline = pipeline(
        Arc::new(FixedBackend::new(&["https://a.example.org/x"])),
        renderer(&[]),
        100,
    );
    let batch = vec![
        SearchParams::new("first").unwrap(),
        SearchParams::new("second").unwrap(),
        SearchParams::new("third").unwrap(),
    ];
    let results = pipeline.run_many(&batch).await.unwrap();
    let queries: Vec<&str> = results.iter().map(|q| q.query.as_str()).collect();
    assert_eq!(queries, vec!["first", "second", "third"]);
    assert!(results.iter().all(|q| q.results.len() == 1));
}

#[tokio::test]
async fn test_run_many_rejects_oversized_batch() {
    let pipeline = pipeline(Arc::new(FixedBackend::new(&[])), renderer(&[]), 100);
    let batch: Vec<SearchParams> = (0..=MAX_BATCH_QUERIES)
        .map(|i| SearchParams::new(format!("q{}", i)).unwrap())
        .collect();
    let err = pipeline.run_many(&batch).await.unwrap_err();
    assert_eq!(err.code_str(), "invalid_input");
}

#[tokio::test]
async fn test_unconfigured_renderer_degrades() {
    let retriever = Retriever::new(&RetrievalConfig::default()).unwrap();
    let pipeline = Pipeline::new(
        Arc::new(FixedBackend::new(&["https://spa.example.org/"])),
        Dispatcher::new(Vec::new()),
        retriever,
        100,
    );
    let report = pipeline
        .run_with_report(&SearchParams::new("spa").unwrap())
        .await
        .unwrap();
    assert_eq!(report.results[0].content, "snippet 0");
    assert_eq!(report.failures[0].code, "not_configured");
}

#[tokio::test]
async fn test_config_pipeline_uses_attached_renderer() {
    let renderer = renderer(&[]);
    let pipeline = Pipeline::from_config(&TrawlConfig::default())
        .unwrap()
        .with_renderer(renderer.clone());

    let item = pipeline
        .process(SearchResult::parse("https://spa.example.org/app", "App", "snippet").unwrap())
        .await;
    assert_eq!(item.strategy, StrategyKind::Dynamic);
    assert!(item.retrieval.is_enriched());
    assert!(item.retrieval.result().content.contains("rendered /app"));
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
}
