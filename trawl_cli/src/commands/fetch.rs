use crate::cli::Cli;
use crate::commands::{build_pipeline, load_config, Result};
use crate::output::{format_output, OutputData};
use trawl_core::SearchResult;

/// Route, retrieve and normalize a single URL.
pub async fn run(cli: &Cli, url: &str, title: &str, word_limit: Option<usize>) -> Result<()> {
    let config = load_config(cli)?;
    let result = SearchResult::parse(url, title, "")?;

    let mut pipeline = build_pipeline(&config).await?;
    if let Some(limit) = word_limit {
        pipeline = pipeline.with_word_limit(limit);
    }

    let item = pipeline.process(result).await;
    let failure = item.failure();
    let data = OutputData::Fetched {
        strategy: item.strategy,
        result: item.retrieval.into_result(),
        failure,
    };
    format_output(&data, &cli.output, !cli.no_color)
}
