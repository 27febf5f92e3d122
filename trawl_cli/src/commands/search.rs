use crate::cli::{Cli, OutputFormat};
use crate::commands::{build_pipeline, load_config, Result};
use crate::output::{format_output, OutputData};
use indicatif::{ProgressBar, ProgressStyle};
use trawl_core::{SearchParams, TimeRange};

pub struct SearchArgs<'a> {
    pub queries: &'a [String],
    pub site: Option<&'a str>,
    pub num_results: usize,
    pub time_range: Option<&'a str>,
    pub word_limit: Option<usize>,
}

/// Run one to three queries through the full pipeline.
pub async fn run(cli: &Cli, args: SearchArgs<'_>) -> Result<()> {
    let config = load_config(cli)?;

    let time_range = match args.time_range {
        Some(raw) => TimeRange::parse_lenient(raw)?,
        None => None,
    };
    let params = args
        .queries
        .iter()
        .map(|query| -> Result<SearchParams> {
            Ok(SearchParams::new(query.as_str())?
                .with_website(args.site.map(str::to_string))
                .with_num_results(args.num_results)?
                .with_time_range(time_range))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut pipeline = build_pipeline(&config).await?;
    if let Some(limit) = args.word_limit {
        pipeline = pipeline.with_word_limit(limit);
    }

    let spinner = spinner(cli, &params);
    let outcome = if let [single] = params.as_slice() {
        pipeline.run_with_report(single).await.map(OutputData::Report)
    } else {
        pipeline.run_many(&params).await.map(OutputData::Batch)
    };
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    format_output(&outcome?, &cli.output, !cli.no_color)
}

fn spinner(cli: &Cli, params: &[SearchParams]) -> Option<ProgressBar> {
    if cli.output != OutputFormat::Pretty {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    let queries: Vec<&str> = params.iter().map(SearchParams::query).collect();
    spinner.set_message(format!("Searching for '{}'...", queries.join("', '")));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    Some(spinner)
}
