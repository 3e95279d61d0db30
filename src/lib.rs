//! ESG Scout: a depth-bounded crawler feeding an ESG disclosure analyzer
//!
//! This crate crawls a single site breadth-first from a seed URL, collects the
//! rendered pages, and submits substantial pages to a content analyzer that
//! returns structured Environmental, Social and Governance findings.

pub mod analysis;
pub mod config;
pub mod crawler;
pub mod output;
pub mod pipeline;
pub mod storage;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Main error type for ESG Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Page renderer unavailable: {0}")]
    RendererUnavailable(String),

    #[error("Crawl session for {seed} exceeded {timeout:?}")]
    SessionTimeout { seed: String, timeout: Duration },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for ESG Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use analysis::{AnalysisReport, CategoryScore, RetryController, RetryPolicy};
pub use config::Config;
pub use crawler::{Coordinator, Frontier, FrontierEntry, PageRecord};
pub use url::{is_eligible, normalize_url};
