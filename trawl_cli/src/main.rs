use clap::Parser;
use owo_colors::OwoColorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands, OutputFormat};
use commands::*;

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    let _ = dotenv::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(cli.verbose).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(!cli.no_color),
        )
        .init();

    let result = match &cli.command {
        Commands::Search {
            queries,
            site,
            num_results,
            time_range,
            word_limit,
        } => {
            search::run(
                &cli,
                search::SearchArgs {
                    queries,
                    site: site.as_deref(),
                    num_results: *num_results,
                    time_range: time_range.as_deref(),
                    word_limit: *word_limit,
                },
            )
            .await
        }
        Commands::Fetch {
            url,
            title,
            word_limit,
        } => fetch::run(&cli, url, title, *word_limit).await,
        Commands::Route { urls } => route::run(&cli, urls),
        Commands::Config { action } => config::run(&cli, action),
    };

    if let Err(e) = result {
        if cli.output == OutputFormat::Json {
            println!("{}", e.to_json());
        } else if cli.no_color {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}: {}", "Error".red().bold(), e);
        }
        process::exit(1);
    }
}

/// `trawl` prefixes both crate targets and the `trawl.*` component targets.
fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "trawl=warn,trawl_cli=info",
        1 => "trawl=info",
        _ => "trawl=debug",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_levels() {
        assert_eq!(default_filter(0), "trawl=warn,trawl_cli=info");
        assert_eq!(default_filter(1), "trawl=info");
        assert_eq!(default_filter(5), "trawl=debug");
    }
}
