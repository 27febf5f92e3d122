use super::{Retrieval, RetrievalFailure, RetrievalStrategy};
use crate::config::RetrievalConfig;
use crate::dispatch::StrategyKind;
use crate::extract::html_to_markdown;
use crate::types::SearchResult;
use crate::utils::strip_multiple_newlines;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// Headless rendering engine.
///
/// One renderer is shared by every in-flight fetch, so `render` must accept
/// concurrent calls. Each call uses its own page or tab.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Rendered DOM serialized as HTML.
    async fn render(&self, url: &Url) -> Result<String, RetrievalFailure>;
}

/// Owns one per-call rendering context (a tab, a page) and closes it exactly
/// once.
///
/// Call [`ContextGuard::close`] on the normal path. When the render future is
/// dropped first, for example by an outer timeout, the guard hands the context
/// to the current tokio runtime to be closed in the background.
pub struct ContextGuard<T: Send + 'static> {
    context: Option<T>,
    close: fn(T) -> BoxFuture<'static, ()>,
}

impl<T: Send + 'static> ContextGuard<T> {
    pub fn new(context: T, close: fn(T) -> BoxFuture<'static, ()>) -> Self {
        Self {
            context: Some(context),
            close,
        }
    }

    pub async fn close(mut self) {
        if let Some(context) = self.context.take() {
            (self.close)(context).await;
        }
    }
}

impl<T: Send + 'static> Drop for ContextGuard<T> {
    fn drop(&mut self) {
        let Some(context) = self.context.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!(
                    target: "trawl.retrieval.dynamic",
                    "render cancelled, closing its context in the background"
                );
                handle.spawn((self.close)(context));
            }
            Err(_) => warn!(
                target: "trawl.retrieval.dynamic",
                "render cancelled outside a runtime, context left open"
            ),
        }
    }
}

/// Renders script-heavy pages and serializes them to markdown.
pub struct DynamicPageStrategy {
    renderer: Option<Arc<dyn PageRenderer>>,
    timeout: Duration,
}

impl DynamicPageStrategy {
    pub fn new(renderer: Option<Arc<dyn PageRenderer>>, config: &RetrievalConfig) -> Self {
        Self {
            renderer,
            timeout: config.render_timeout(),
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    async fn render_text(&self, url: &Url) -> Result<String, RetrievalFailure> {
        let renderer = self
            .renderer
            .as_ref()
            .ok_or_else(|| RetrievalFailure::NotConfigured("page renderer".to_string()))?;

        let html = tokio::time::timeout(self.timeout, renderer.render(url))
            .await
            .map_err(|_| RetrievalFailure::Timeout(self.timeout.as_millis() as u64))??;

        let text = strip_multiple_newlines(&html_to_markdown(&html));
        if text.trim().is_empty() {
            return Err(RetrievalFailure::Empty);
        }
        Ok(text)
    }
}

#[async_trait]
impl RetrievalStrategy for DynamicPageStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Dynamic
    }

    async fn fetch(&self, result: SearchResult) -> Retrieval {
        let start = Instant::now();
        match self.render_text(result.url()).await {
            Ok(text) => {
                debug!(
                    target: "trawl.retrieval.dynamic",
                    url = %result.url(),
                    chars = text.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "render complete"
                );
                Retrieval::Enriched(result.with_content(text))
            }
            Err(reason) => {
                warn!(
                    target: "trawl.retrieval.dynamic",
                    url = %result.url(),
                    reason = %reason,
                    "render failed, keeping snippet"
                );
                Retrieval::Unchanged { result, reason }
            }
        }
    }
}

#[cfg(feature = "browser")]
mod chromium {
    use super::{ContextGuard, PageRenderer};
    use crate::config::RetrievalConfig;
    use crate::error::TrawlError;
    use crate::retrieval::RetrievalFailure;
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser, BrowserConfig};
    use chromiumoxide::Page;
    use futures::future::BoxFuture;
    use futures::{FutureExt, StreamExt};
    use std::time::Duration;
    use tokio::task::JoinHandle;
    use tracing::debug;
    use url::Url;

    fn close_page(page: Page) -> BoxFuture<'static, ()> {
        async move {
            if let Err(e) = page.close().await {
                debug!(target: "trawl.retrieval.dynamic", error = %e, "page close failed");
            }
        }
        .boxed()
    }

    /// Headless Chromium driven over CDP.
    pub struct ChromiumRenderer {
        browser: Browser,
        handler: JoinHandle<()>,
        settle: Duration,
        timeout: Duration,
    }

    impl ChromiumRenderer {
        /// Launch a browser process. Needs Chromium or Chrome installed.
        pub async fn launch(config: &RetrievalConfig) -> Result<Self, TrawlError> {
            let browser_config = BrowserConfig::builder()
                .no_sandbox()
                .arg("--disable-gpu")
                .arg("--disable-dev-shm-usage")
                .window_size(1920, 1080)
                .build()
                .map_err(|e| TrawlError::Config(format!("browser config: {}", e)))?;

            let (browser, mut handler) = Browser::launch(browser_config)
                .await
                .map_err(|e| TrawlError::Config(format!("browser launch failed: {}", e)))?;

            // CDP events only flow while the handler is polled
            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            Ok(Self {
                browser,
                handler,
                settle: config.settle(),
                timeout: config.render_timeout(),
            })
        }
    }

    impl Drop for ChromiumRenderer {
        fn drop(&mut self) {
            self.handler.abort();
        }
    }

    #[async_trait]
    impl PageRenderer for ChromiumRenderer {
        fn name(&self) -> &'static str {
            "chromium"
        }

        async fn render(&self, url: &Url) -> Result<String, RetrievalFailure> {
            let page = self
                .browser
                .new_page("about:blank")
                .await
                .map_err(|e| RetrievalFailure::Render(format!("new page failed: {}", e)))?;

            let guard = ContextGuard::new(page.clone(), close_page);

            let loaded = tokio::time::timeout(self.timeout, async {
                page.goto(url.as_str()).await?;
                page.wait_for_navigation().await?;
                tokio::time::sleep(self.settle).await;
                page.content().await
            })
            .await;
            guard.close().await;

            match loaded {
                Ok(html) => html.map_err(|e| RetrievalFailure::Render(e.to_string())),
                Err(_) => Err(RetrievalFailure::Timeout(self.timeout.as_millis() as u64)),
            }
        }
    }
}

#[cfg(feature = "browser")]
pub use chromium::ChromiumRenderer;
