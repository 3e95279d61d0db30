//! Content analyzer boundary
//!
//! The analyzer is an external capability. Its result is a tagged
//! [`AnalyzerResponse`] so callers branch on rate limiting with a plain
//! `match` instead of inspecting error types.

use crate::analysis::report::SchemaError;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

/// One submission to the analyzer
#[derive(Debug, Clone)]
pub struct AnalysisRequest<'a> {
    /// Page the text came from
    pub url: &'a str,

    /// Text to analyze, already truncated to the input limit
    pub text: &'a str,

    /// When the analysis was requested; used as the report timestamp
    pub requested_at: DateTime<Utc>,
}

impl<'a> AnalysisRequest<'a> {
    pub fn new(url: &'a str, text: &'a str) -> Self {
        Self {
            url,
            text,
            requested_at: Utc::now(),
        }
    }

    /// Returns the request time as an RFC 3339 string
    pub fn timestamp(&self) -> String {
        self.requested_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Non-retryable analyzer failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalyzerError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Analyzer returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed analyzer response: {0}")]
    MalformedResponse(String),
}

/// Outcome of a single analyzer call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyzerResponse {
    /// Raw model output, expected to hold one report as JSON
    Success(String),

    /// Quota or rate limit hit; the same request may succeed later
    RateLimited(String),

    /// Anything else; retrying will not help
    Fatal(AnalyzerError),
}

/// Why a retry-controlled analysis produced no report
#[derive(Debug, Error)]
pub enum AnalysisFailure {
    #[error("Quota exhausted after {attempts} attempts")]
    QuotaExhausted { attempts: u32 },

    #[error("Analyzer error: {0}")]
    Analyzer(#[from] AnalyzerError),

    #[error("Could not decode analyzer output: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Analyzer output does not match the report schema: {0}")]
    Schema(#[from] SchemaError),
}

/// Capability that turns page text into a structured ESG assessment
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Submits one request; never retries on its own
    async fn analyze(&self, request: &AnalysisRequest<'_>) -> AnalyzerResponse;
}
