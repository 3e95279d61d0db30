//! ESG analysis of crawled pages
//!
//! This module contains:
//! - The content analyzer boundary and its tagged response type
//! - A Gemini-backed analyzer
//! - The report schema and decoding of raw analyzer output
//! - The retry controller that absorbs rate limiting

mod analyzer;
mod gemini;
mod report;
mod retry;

pub use analyzer::{AnalysisFailure, AnalysisRequest, Analyzer, AnalyzerError, AnalyzerResponse};
pub use gemini::{build_prompt, GeminiAnalyzer};
pub use report::{decode_report, strip_code_fence, AnalysisReport, CategoryScore, SchemaError};
pub use retry::{truncate_chars, RetryController, RetryPolicy};
