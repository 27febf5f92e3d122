//! HTML → text extraction used by the static-page strategy.

use crate::utils::strip_multiple_newlines;
use htmd::HtmlToMarkdown;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Turns a page body into the text that replaces a result's snippet.
///
/// Implementations must be cheap to share across concurrent fetches.
pub trait HtmlExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, html: &str) -> String;
}

/// Extractor selected by `retrieval.extractor`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractorKind {
    #[default]
    Paragraphs,
    MainContent,
}

impl ExtractorKind {
    pub fn build(self) -> Arc<dyn HtmlExtractor> {
        match self {
            ExtractorKind::Paragraphs => Arc::new(ParagraphExtractor),
            ExtractorKind::MainContent => Arc::new(MainContentExtractor),
        }
    }
}

/// Joins the text of every `<p>` element with single spaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphExtractor;

impl HtmlExtractor for ParagraphExtractor {
    fn name(&self) -> &'static str {
        "paragraphs"
    }

    fn extract(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        let Ok(selector) = Selector::parse("p") else {
            return String::new();
        };

        document
            .select(&selector)
            .map(|p| p.text().collect::<String>())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Locates the main content block and renders it as markdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct MainContentExtractor;

impl HtmlExtractor for MainContentExtractor {
    fn name(&self) -> &'static str {
        "main-content"
    }

    fn extract(&self, html: &str) -> String {
        let document = Html::parse_document(&strip_multiple_newlines(html));
        let main_html = find_main_content(&document);
        strip_multiple_newlines(&html_to_markdown(&main_html))
    }
}

pub fn find_main_content(html: &Html) -> String {
    // Try common content selectors in order of likelihood
    let selectors = [
        "article",
        "main",
        "[role='main']",
        ".post-content",
        "#post_content",
        ".article-content",
        ".entry-content",
        ".content-area",
        ".main-content",
        ".post-body",
        ".article__body",
        ".post__content",
        "[itemprop='articleBody']",
        ".story-body",
        ".story__body",
        // Fallbacks
        ".content",
        "#content",
        ".page-content",
    ];

    for selector_str in selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = html.select(&selector).next() {
                return element.html();
            }
        }
    }

    for fallback in ["body", "html"] {
        if let Ok(selector) = Selector::parse(fallback) {
            if let Some(element) = html.select(&selector).next() {
                return element.html();
            }
        }
    }

    String::new()
}

pub fn html_to_markdown(html: &str) -> String {
    let converter = HtmlToMarkdown::builder()
        .skip_tags(vec![
            "script", "style", "noscript", "nav", "footer", "header", "aside", "img", "svg",
            "form", "iframe",
        ])
        .build();
    converter.convert(html).unwrap_or_else(|_| html.to_string())
}
