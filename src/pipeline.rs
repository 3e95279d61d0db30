//! End-to-end run: crawl, analyze, archive, export
//!
//! A run crawls one seed (optionally under a session timeout), sends every
//! substantial page through the retry controller in visit order, archives
//! the reports when an archive is attached, and writes the JSON and Markdown
//! exports.

use crate::analysis::{AnalysisReport, Analyzer, RetryController};
use crate::config::Config;
use crate::crawler::{extract_text, Coordinator, CrawlOutcome, Politeness, Renderer, SessionStats};
use crate::output::{export_document_from_archive, write_json_reports, write_report_document};
use crate::storage::{ReportStore, RunStatus};
use crate::{Result, ScoutError};
use std::path::Path;
use std::sync::Arc;

/// What one run produced
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub seed_url: String,

    /// Archive run ID, when an archive is attached
    pub run_id: Option<i64>,

    pub pages_crawled: usize,

    /// Pages submitted to the analyzer
    pub pages_analyzed: usize,

    /// Pages below the minimum content length
    pub pages_skipped: usize,

    /// Submitted pages that produced no report
    pub analysis_failures: usize,

    pub crawl: SessionStats,

    /// Reports in the visit order of their pages
    pub reports: Vec<AnalysisReport>,
}

/// Wires the crawl driver, the retry controller and the report sinks together
pub struct Pipeline {
    config: Config,
    coordinator: Coordinator,
    controller: Option<RetryController>,
    archive: Option<Box<dyn ReportStore>>,
    config_hash: String,
}

impl Pipeline {
    /// Creates a crawl-only pipeline; attach an analyzer to produce reports
    pub fn new(config: Config, renderer: Arc<dyn Renderer>) -> Self {
        let coordinator = Coordinator::new(config.crawler.clone(), renderer);
        Self {
            config,
            coordinator,
            controller: None,
            archive: None,
            config_hash: String::new(),
        }
    }

    /// Analyzes pages with `analyzer`, using the configured retry policy
    pub fn with_analyzer(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.controller = Some(RetryController::from_config(analyzer, &self.config.analyzer));
        self
    }

    pub fn with_retry_controller(mut self, controller: RetryController) -> Self {
        self.controller = Some(controller);
        self
    }

    /// Archives runs and reports in `archive`, tagging runs with `config_hash`
    pub fn with_archive(mut self, archive: Box<dyn ReportStore>, config_hash: impl Into<String>) -> Self {
        self.archive = Some(archive);
        self.config_hash = config_hash.into();
        self
    }

    pub fn with_politeness(mut self, politeness: Politeness) -> Self {
        self.coordinator = self.coordinator.with_politeness(politeness);
        self
    }

    /// Runs the whole pipeline for one seed URL
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The run completed, possibly with per-page failures
    /// * `Err(ScoutError)` - The crawl session failed, timed out, or an export could not be written
    pub async fn run(&mut self, seed_url: &str) -> Result<RunSummary> {
        let run_id = match self.archive.as_mut() {
            Some(archive) => Some(archive.create_run(&self.config_hash, seed_url)?),
            None => None,
        };

        let outcome = match self.crawl(seed_url).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let status = if matches!(e, ScoutError::SessionTimeout { .. }) {
                    RunStatus::TimedOut
                } else {
                    RunStatus::Failed
                };
                self.finish_run(run_id, status);
                return Err(e);
            }
        };

        let mut summary = RunSummary {
            seed_url: seed_url.to_string(),
            run_id,
            pages_crawled: outcome.pages.len(),
            crawl: outcome.stats.clone(),
            ..RunSummary::default()
        };

        if let Err(e) = self.analyze_pages(&outcome, run_id, &mut summary).await {
            self.finish_run(run_id, RunStatus::Failed);
            return Err(e);
        }
        self.finish_run(run_id, RunStatus::Completed);
        self.export(&summary.reports)?;

        tracing::info!(
            "Run complete: {} pages crawled, {} analyzed, {} reports",
            summary.pages_crawled,
            summary.pages_analyzed,
            summary.reports.len()
        );

        Ok(summary)
    }

    async fn crawl(&self, seed_url: &str) -> Result<CrawlOutcome> {
        let session = self.coordinator.crawl(seed_url);

        match self.config.crawler.session_timeout() {
            Some(limit) => tokio::time::timeout(limit, session).await.map_err(|_| {
                tracing::error!("Crawl of {} exceeded the session timeout of {:?}", seed_url, limit);
                ScoutError::SessionTimeout {
                    seed: seed_url.to_string(),
                    timeout: limit,
                }
            })?,
            None => session.await,
        }
    }

    async fn analyze_pages(
        &mut self,
        outcome: &CrawlOutcome,
        run_id: Option<i64>,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let Some(controller) = &self.controller else {
            tracing::warn!(
                "No analyzer configured, skipping analysis of {} pages",
                outcome.pages.len()
            );
            return Ok(());
        };

        let min_length = self.config.analyzer.min_content_length;

        for page in &outcome.pages {
            let length = page.rendered_content.chars().count();
            if length < min_length {
                tracing::debug!("Skipping {}: {} chars of content", page.url, length);
                summary.pages_skipped += 1;
                continue;
            }

            let text = extract_text(&page.rendered_content);
            summary.pages_analyzed += 1;

            match controller.analyze_with_retry(&text, &page.url).await {
                Some(report) => {
                    if let (Some(archive), Some(run_id)) = (self.archive.as_mut(), run_id) {
                        archive.save_report(run_id, &report)?;
                    }
                    summary.reports.push(report);
                }
                None => summary.analysis_failures += 1,
            }
        }

        Ok(())
    }

    /// Writes the JSON export and, when configured, the master document
    fn export(&self, reports: &[AnalysisReport]) -> Result<()> {
        let json_path = Path::new(&self.config.output.json_path);
        write_json_reports(reports, json_path)?;
        tracing::info!("Exported {} report(s) to {}", reports.len(), json_path.display());

        if let Some(document_path) = &self.config.output.document_path {
            let document_path = Path::new(document_path);
            match &self.archive {
                Some(archive) => {
                    export_document_from_archive(archive.as_ref(), document_path)?;
                }
                None => {
                    let newest_first: Vec<AnalysisReport> = reports.iter().rev().cloned().collect();
                    write_report_document(&newest_first, document_path)?;
                }
            }
        }

        Ok(())
    }

    // A run whose status cannot be recorded is still reported to the caller
    fn finish_run(&mut self, run_id: Option<i64>, status: RunStatus) {
        if let (Some(archive), Some(run_id)) = (self.archive.as_mut(), run_id) {
            if let Err(e) = archive.complete_run(run_id, status) {
                tracing::warn!("Failed to record status of run {}: {}", run_id, e);
            }
        }
    }
}
