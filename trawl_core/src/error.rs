// src/error.rs
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum TrawlError {
    #[error("Search backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Search backend protocol error: {0}")]
    BackendProtocol(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl TrawlError {
    pub fn code_str(&self) -> &'static str {
        match self {
            TrawlError::BackendUnavailable(_) => "backend_unavailable",
            TrawlError::BackendProtocol(_) => "backend_protocol_error",
            TrawlError::InvalidInput(_) => "invalid_input",
            TrawlError::Config(_) | TrawlError::Toml(_) => "config_error",
            TrawlError::NotConfigured(_) => "not_configured",
            TrawlError::HttpRequest(_) => "upstream_error",
            TrawlError::SerdeJson(_) => "parse_error",
            TrawlError::Io(_) => "io_error",
        }
    }

    /// Machine-readable form, used by the CLI's JSON error output.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "code": self.code_str(),
            "message": self.to_string(),
        })
    }
}
