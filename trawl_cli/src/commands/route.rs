use crate::cli::Cli;
use crate::commands::{load_config, Result};
use crate::output::{format_output, OutputData};
use trawl_core::dispatch::RouteDecision;
use trawl_core::{Dispatcher, SearchResult};

/// Print the dispatch decision for each URL. No network access.
pub fn run(cli: &Cli, urls: &[String]) -> Result<()> {
    let config = load_config(cli)?;
    let dispatcher = Dispatcher::from_config(&config.retrieval);

    let routes = urls
        .iter()
        .map(|raw| -> Result<RouteDecision> {
            let result = SearchResult::parse(raw, "", "")?;
            Ok(dispatcher.explain(result.url()))
        })
        .collect::<Result<Vec<_>>>()?;

    format_output(&OutputData::Routes(routes), &cli.output, !cli.no_color)
}
