//! Pretty formatter for terminal output.
//!
//! Results render as numbered cards: bold title, link, then a wrapped excerpt
//! of the retrieved content. Items that kept their snippet are listed last.

use super::OutputData;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;
use trawl_core::pipeline::ItemFailure;
use trawl_core::utils::excerpt;
use trawl_core::{SearchResult, StrategyKind};

/// Terminal width for formatting (default fallback)
const DEFAULT_WIDTH: usize = 80;

/// Indent for card content (after number)
const CARD_INDENT: usize = 5;

/// Characters of content shown per card
const EXCERPT_CHARS: usize = 400;

pub fn format_pretty(data: &OutputData) -> String {
    let width = terminal_width();
    match data {
        OutputData::Report(report) => {
            let mut out = format_section_header(&report.query, report.results.len(), width);
            out.push_str(&format_cards(&report.results, width));
            out.push_str(&format_failures(&report.failures));
            out.push_str(&format!(
                "\n{}\n",
                format!("{} ms", report.duration_ms).dimmed()
            ));
            out
        }
        OutputData::Batch(batch) => batch
            .iter()
            .map(|query| {
                let mut out = format_section_header(&query.query, query.results.len(), width);
                out.push_str(&format_cards(&query.results, width));
                out
            })
            .collect::<Vec<_>>()
            .join("\n"),
        OutputData::Fetched {
            strategy,
            result,
            failure,
        } => {
            let mut out = String::new();
            out.push('\n');
            out.push_str(&format!(
                "{} {}\n",
                "Strategy:".bold().cyan(),
                strategy_label(*strategy)
            ));
            out.push_str(&format!("{} {}\n", "URL:".bold().cyan(), result.url().blue()));
            if !result.title.is_empty() {
                out.push_str(&format!("{} {}\n", "Title:".bold().cyan(), result.title.bold()));
            }
            out.push('\n');
            out.push_str(&wrap(&result.content, width, ""));
            out.push('\n');
            if let Some(failure) = failure {
                out.push_str(&format_failures(std::slice::from_ref(failure)));
            }
            out
        }
        OutputData::Routes(routes) => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL_CONDENSED)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_width(width as u16)
                .set_header(vec!["URL", "Strategy", "Rule"]);
            for route in routes {
                table.add_row(vec![
                    Cell::new(&route.url),
                    Cell::new(route.strategy.as_str()),
                    Cell::new(route.rule.as_deref().unwrap_or("(fallback)")),
                ]);
            }
            format!("{}\n", table)
        }
        OutputData::ConfigInfo(value) => {
            let body = serde_json::to_string_pretty(value).unwrap_or_default();
            format!("{}\n", body)
        }
        OutputData::Message(message) => format!("{}\n", message),
    }
}

fn format_section_header(query: &str, count: usize, width: usize) -> String {
    let label = format!(" {} ", query);
    let counter = format!(" {} results ", count);
    let fill = width
        .saturating_sub(label.chars().count() + counter.chars().count() + 4)
        .max(2);
    format!(
        "\n{}{}{}{}\n\n",
        "──".dimmed(),
        label.bold().cyan(),
        "─".repeat(fill).dimmed(),
        counter.dimmed()
    )
}

fn format_cards(results: &[SearchResult], width: usize) -> String {
    let indent = " ".repeat(CARD_INDENT);
    let mut out = String::new();
    for (i, result) in results.iter().enumerate() {
        let number = format!("{:>3}.", i + 1);
        let title = if result.title.is_empty() {
            result.url().as_str().to_string()
        } else {
            result.title.clone()
        };
        out.push_str(&format!("{} {}\n", number.green().bold(), title.bold()));
        out.push_str(&format!("{}{}\n", indent, result.url().blue()));
        if !result.content.is_empty() {
            out.push_str(&wrap(&excerpt(&result.content, EXCERPT_CHARS), width, &indent));
        }
        out.push('\n');
    }
    out
}

fn format_failures(failures: &[ItemFailure]) -> String {
    if failures.is_empty() {
        return String::new();
    }
    let mut out = format!(
        "{} {} kept their search snippet:\n",
        "Note:".yellow().bold(),
        failures.len()
    );
    for failure in failures {
        out.push_str(&format!(
            "  {} {} {}\n",
            "•".dimmed(),
            failure.url,
            format!("({}: {})", failure.strategy, failure.reason).dimmed()
        ));
    }
    out
}

fn strategy_label(kind: StrategyKind) -> String {
    match kind {
        StrategyKind::StructuredApi => kind.as_str().magenta().to_string(),
        StrategyKind::Static => kind.as_str().green().to_string(),
        StrategyKind::Dynamic => kind.as_str().yellow().to_string(),
    }
}

fn wrap(text: &str, width: usize, indent: &str) -> String {
    let options = textwrap::Options::new(width.saturating_sub(2).max(20))
        .initial_indent(indent)
        .subsequent_indent(indent);
    let mut out = textwrap::fill(text, options);
    out.push('\n');
    out
}

fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(DEFAULT_WIDTH)
}
