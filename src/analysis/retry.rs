//! Retry controller wrapping the content analyzer
//!
//! Only rate-limit signals are retried, with exponential backoff plus
//! uniform jitter between attempts. Every other failure, including output
//! that does not decode into a report, ends the analysis of that page at
//! once.

use crate::analysis::analyzer::{AnalysisFailure, AnalysisRequest, Analyzer, AnalyzerResponse};
use crate::analysis::report::{decode_report, AnalysisReport};
use crate::config::AnalyzerConfig;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Backoff parameters for one analyzer call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total analyzer calls allowed, including the first
    pub max_attempts: u32,

    /// Delay after the first rate-limited attempt, doubled for each further one
    pub base_delay: Duration,

    /// Upper bound of the uniform jitter added to every delay
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(10),
            max_jitter: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay),
            max_jitter: Duration::from_millis(config.max_jitter),
        }
    }

    /// Deterministic part of the delay after `attempt` (1-based): `base * 2^(attempt-1)`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }

    /// Full delay after `attempt`, jitter included
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff(attempt).saturating_add(self.jitter())
    }

    fn jitter(&self) -> Duration {
        let max = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        if max == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::rng().random_range(0..=max))
        }
    }
}

/// Wraps an [`Analyzer`] with input truncation, bounded retries and report decoding
pub struct RetryController {
    analyzer: Arc<dyn Analyzer>,
    policy: RetryPolicy,
    max_input_chars: usize,
}

impl RetryController {
    pub fn new(analyzer: Arc<dyn Analyzer>, policy: RetryPolicy, max_input_chars: usize) -> Self {
        Self {
            analyzer,
            policy,
            max_input_chars,
        }
    }

    pub fn from_config(analyzer: Arc<dyn Analyzer>, config: &AnalyzerConfig) -> Self {
        Self::new(
            analyzer,
            RetryPolicy::from_config(config),
            config.max_input_chars,
        )
    }

    /// Analyzes `text` from `url`, returning why no report was produced on failure
    pub async fn try_analyze(
        &self,
        text: &str,
        url: &str,
    ) -> Result<AnalysisReport, AnalysisFailure> {
        let text = truncate_chars(text, self.max_input_chars);
        let request = AnalysisRequest::new(url, text);
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.analyzer.analyze(&request).await {
                AnalyzerResponse::Success(raw) => return decode_report(&raw, &request),
                AnalyzerResponse::Fatal(e) => return Err(e.into()),
                AnalyzerResponse::RateLimited(detail) => {
                    if attempt >= self.policy.max_attempts {
                        return Err(AnalysisFailure::QuotaExhausted { attempts: attempt });
                    }

                    let delay = self.policy.delay_for(attempt);
                    tracing::warn!(
                        "Quota exceeded for {}. Retrying in {:.2}s (attempt {}/{}): {}",
                        url,
                        delay.as_secs_f64(),
                        attempt,
                        self.policy.max_attempts,
                        detail
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Analyzes `text` from `url`; failures are logged and yield `None`
    pub async fn analyze_with_retry(&self, text: &str, url: &str) -> Option<AnalysisReport> {
        match self.try_analyze(text, url).await {
            Ok(report) => {
                tracing::info!(
                    "Analyzed {} ({}), average score {:.1}",
                    url,
                    report.company_name,
                    report.average_score()
                );
                Some(report)
            }
            Err(AnalysisFailure::QuotaExhausted { attempts }) => {
                tracing::error!("Quota exceeded for {}. Gave up after {} attempts", url, attempts);
                None
            }
            Err(e) => {
                tracing::error!("Extraction failed for {}: {}", url, e);
                None
            }
        }
    }
}

/// Cuts `text` to at most `max_chars` characters on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
