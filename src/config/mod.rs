//! Configuration module for ESG Scout
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Configuration is always passed explicitly into the crawler and analyzer
//! constructors; nothing reads it from process-wide state.
//!
//! # Example
//!
//! ```no_run
//! use esg_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("esg-scout.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{AnalyzerConfig, Config, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{
    compute_config_hash, hash_config_text, load_config, load_config_with_hash, parse_config,
};
pub use validation::validate;
