pub mod config;
pub mod fetch;
pub mod route;
pub mod search;

use crate::cli::Cli;
use serde_json::json;
use thiserror::Error;
use trawl_core::{Pipeline, TrawlConfig};

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Core(#[from] trawl_core::TrawlError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CommandError {
    pub fn code_str(&self) -> &'static str {
        match self {
            CommandError::InvalidConfig(_) => "config_error",
            CommandError::Core(e) => e.code_str(),
            CommandError::Serialization(_) | CommandError::Yaml(_) => "serialization_error",
            CommandError::Io(_) => "io_error",
        }
    }

    /// `{"error": {"code", "message"}}`, printed instead of the colored line
    /// under `--output json`.
    pub fn to_json(&self) -> serde_json::Value {
        let error = match self {
            CommandError::Core(e) => e.to_json(),
            _ => json!({
                "code": self.code_str(),
                "message": self.to_string(),
            }),
        };
        json!({ "error": error })
    }
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// Effective configuration for this invocation.
pub fn load_config(cli: &Cli) -> Result<TrawlConfig> {
    Ok(TrawlConfig::load(cli.config.as_deref())?)
}

/// Pipeline for search and fetch: SearXNG backend, config routes, the Reddit
/// client when credentials exist, and headless Chromium when it launches.
pub async fn build_pipeline(config: &TrawlConfig) -> Result<Pipeline> {
    #[allow(unused_mut)]
    let mut pipeline = Pipeline::from_config(config)?;

    #[cfg(feature = "browser")]
    {
        match trawl_core::ChromiumRenderer::launch(&config.retrieval).await {
            Ok(renderer) => pipeline = pipeline.with_renderer(std::sync::Arc::new(renderer)),
            Err(e) => tracing::warn!(
                "headless browser unavailable, dynamic pages will keep their snippets: {}",
                e
            ),
        }
    }

    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trawl_core::TrawlError;

    #[test]
    fn test_core_error_json() {
        let err = CommandError::from(TrawlError::BackendUnavailable("connection refused".into()));
        let value = err.to_json();
        assert_eq!(value["error"]["code"], "backend_unavailable");
        assert!(value["error"]["message"]
            .as_str()
            .unwrap()
            .contains("connection refused"));
    }

    #[test]
    fn test_cli_error_json() {
        let err = CommandError::InvalidConfig("/tmp/x.toml already exists".into());
        assert_eq!(err.to_json()["error"]["code"], "config_error");
    }
}
