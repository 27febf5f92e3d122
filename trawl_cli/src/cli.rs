use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "trawl")]
#[command(about = "Trawl - search the web and pull back full page content")]
#[command(version)]
#[command(after_help = "\x1b[1;36mQuick Start:\x1b[0m
  trawl search \"rust async runtimes\"          Search and retrieve every result
  trawl search \"tokio\" --site docs.rs -n 5     Restrict to one site
  trawl fetch https://example.com/post        Retrieve a single page
  trawl route https://www.reddit.com/r/rust   Show which strategy a URL uses

\x1b[1;36mConfiguration:\x1b[0m
  trawl config path                           Where the config file lives
  trawl config init                           Write a default config file
  trawl config show                           Effective configuration

\x1b[1;36mEnvironment:\x1b[0m
  TRAWL_SEARXNG_URL, TRAWL_MAX_PAGES, TRAWL_TIMEOUT_SECS, TRAWL_WORD_LIMIT,
  TRAWL_STATIC_SITES, REDDIT_CLIENT_ID, REDDIT_CLIENT_SECRET, REDDIT_USER_AGENT")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Path to a TOML config file
    #[arg(long, global = true, env = "TRAWL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search, then retrieve and normalize every result
    ///
    /// Up to three queries run concurrently. Results keep the search
    /// backend's order; pages that cannot be retrieved keep their snippet.
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  trawl search \"rust borrow checker\"
  trawl search \"tokio select\" --site docs.rs --num-results 3
  trawl search \"release notes\" \"changelog\" --time-range month
  trawl search \"axum\" --output json")]
    Search {
        /// One to three queries
        #[arg(required = true, num_args = 1..=3)]
        queries: Vec<String>,
        /// Restrict results to a domain (adds a site: filter)
        #[arg(short, long)]
        site: Option<String>,
        /// Maximum number of results per query
        #[arg(short = 'n', long, default_value_t = trawl_core::types::DEFAULT_NUM_RESULTS)]
        num_results: usize,
        /// Recency filter: day, month or year
        #[arg(short, long)]
        time_range: Option<String>,
        /// Keep at most this many words of each page
        #[arg(short, long, value_parser = word_limit_parser())]
        word_limit: Option<usize>,
    },

    /// Retrieve and normalize a single URL
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  trawl fetch https://example.com/article
  trawl fetch https://www.reddit.com/r/rust/comments/abc123/ --output text")]
    Fetch {
        /// The page to retrieve
        url: String,
        /// Title to attach to the result
        #[arg(long, default_value = "")]
        title: String,
        /// Keep at most this many words
        #[arg(short, long, value_parser = word_limit_parser())]
        word_limit: Option<usize>,
    },

    /// Show which retrieval strategy each URL would use
    Route {
        /// URLs to route
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

fn word_limit_parser() -> clap::builder::RangedU64ValueParser<usize> {
    clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
}

#[derive(Subcommand, Clone)]
pub enum ConfigAction {
    /// Show the effective configuration (file + environment)
    Show,
    /// Print the default config file path
    Path,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Pretty,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Plain text output
    Text,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_search_args() {
        let cli = Cli::try_parse_from([
            "trawl", "search", "rust", "tokio", "--site", "docs.rs", "-n", "3", "--output", "json",
        ])
        .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        match cli.command {
            Commands::Search {
                queries,
                site,
                num_results,
                ..
            } => {
                assert_eq!(queries, vec!["rust", "tokio"]);
                assert_eq!(site.as_deref(), Some("docs.rs"));
                assert_eq!(num_results, 3);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_too_many_queries() {
        assert!(Cli::try_parse_from(["trawl", "search", "a", "b", "c", "d"]).is_err());
    }

    #[test]
    fn test_word_limit_must_be_positive() {
        assert!(Cli::try_parse_from(["trawl", "search", "rust", "--word-limit", "0"]).is_err());
        assert!(Cli::try_parse_from(["trawl", "fetch", "https://example.com/", "-w", "0"]).is_err());

        let cli = Cli::try_parse_from(["trawl", "fetch", "https://example.com/", "-w", "25"])
            .unwrap();
        match cli.command {
            Commands::Fetch { word_limit, .. } => assert_eq!(word_limit, Some(25)),
            _ => panic!("expected fetch"),
        }
    }
}
