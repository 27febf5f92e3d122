use crate::cli::OutputFormat;
use crate::commands::Result;
use serde::Serialize;
use serde_json::Value;
use trawl_core::dispatch::RouteDecision;
use trawl_core::pipeline::{ItemFailure, PipelineReport, QueryResults};
use trawl_core::{SearchResult, StrategyKind};

mod pretty;
pub use pretty::format_pretty;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OutputData {
    Report(PipelineReport),
    Batch(Vec<QueryResults>),
    Fetched {
        strategy: StrategyKind,
        result: SearchResult,
        failure: Option<ItemFailure>,
    },
    Routes(Vec<RouteDecision>),
    ConfigInfo(Value),
    Message(String),
}

pub fn format_output(data: &OutputData, format: &OutputFormat, color: bool) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(data)?);
        }
        OutputFormat::Pretty if color => {
            print!("{}", format_pretty(data));
        }
        OutputFormat::Pretty | OutputFormat::Text => {
            print!("{}", format_text(data)?);
        }
    }
    Ok(())
}

fn format_text(data: &OutputData) -> Result<String> {
    let mut out = String::new();
    match data {
        OutputData::Report(report) => {
            push_results(&mut out, &report.results);
            for failure in &report.failures {
                out.push_str(&format!(
                    "# kept snippet for {} ({}: {})\n",
                    failure.url, failure.strategy, failure.reason
                ));
            }
        }
        OutputData::Batch(batch) => {
            for query in batch {
                out.push_str(&format!("## {}\n\n", query.query));
                push_results(&mut out, &query.results);
            }
        }
        OutputData::Fetched { result, .. } => {
            push_results(&mut out, std::slice::from_ref(result));
        }
        OutputData::Routes(routes) => {
            for route in routes {
                out.push_str(&format!("{}\t{}\n", route.strategy, route.url));
            }
        }
        OutputData::ConfigInfo(value) => {
            out.push_str(&serde_json::to_string_pretty(value)?);
            out.push('\n');
        }
        OutputData::Message(message) => {
            out.push_str(message);
            out.push('\n');
        }
    }
    Ok(out)
}

fn push_results(out: &mut String, results: &[SearchResult]) {
    for result in results {
        out.push_str(&result.title);
        out.push('\n');
        out.push_str(result.url().as_str());
        out.push('\n');
        out.push_str(&result.content);
        out.push_str("\n\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_routes() {
        let data = OutputData::Routes(vec![RouteDecision {
            url: "https://example.com/".to_string(),
            strategy: StrategyKind::Static,
            rule: Some("static_site:example.com".to_string()),
        }]);
        assert_eq!(format_text(&data).unwrap(), "static\thttps://example.com/\n");
    }

    #[test]
    fn test_json_shape() {
        let result = SearchResult::parse("https://example.com/a", "A", "body").unwrap();
        let data = OutputData::Fetched {
            strategy: StrategyKind::Dynamic,
            result,
            failure: None,
        };
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["type"], "Fetched");
        assert_eq!(value["data"]["strategy"], "dynamic");
        assert_eq!(value["data"]["result"]["url"], "https://example.com/a");
    }
}
