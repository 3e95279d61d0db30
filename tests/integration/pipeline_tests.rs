//! End-to-end pipeline tests
//!
//! One wiremock server serves the company site, another plays the
//! analyzer API; exports land in a temporary directory.

use crate::{html_page, mount_html};
use esg_scout::analysis::{AnalysisReport, GeminiAnalyzer, RetryController, RetryPolicy};
use esg_scout::config::Config;
use esg_scout::crawler::HttpRenderer;
use esg_scout::pipeline::Pipeline;
use esg_scout::storage::{open_archive, ReportStore, RunStatus};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(dir: &Path, analyzer_endpoint: &str) -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = 1;
    config.crawler.request_timeout = 2_000;
    config.crawler.politeness_min = 0;
    config.crawler.politeness_max = 0;
    config.analyzer.endpoint = analyzer_endpoint.to_string();
    config.analyzer.model = "gemini-test".to_string();
    config.analyzer.base_delay = 5;
    config.analyzer.max_jitter = 0;
    config.output.json_path = dir.join("results.json").display().to_string();
    config.output.document_path = Some(dir.join("report.md").display().to_string());
    config.output.database_path = Some(dir.join("archive.db").display().to_string());
    config
}

async fn start_site() -> MockServer {
    let site = MockServer::start().await;

    mount_html(
        &site,
        "/",
        html_page("Corp AG", &["/sustainability", "/careers", "/broken"], 30),
    )
    .await;
    mount_html(&site, "/sustainability", html_page("Sustainability", &[], 30)).await;
    mount_html(&site, "/careers", html_page("Careers", &[], 0)).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&site)
        .await;

    site
}

/// Analyzer reply without url or timestamp, which are filled from the request
fn analyzer_reply() -> ResponseTemplate {
    let report = json!({
        "company_name": "Corp AG",
        "summary": "Discloses climate targets; social reporting is thin.",
        "environmental": { "score": 75, "assessment": "Scope 1-3 emissions", "gaps": "No taxonomy alignment" },
        "social": { "score": 40, "assessment": "Health and safety", "gaps": "No supply chain due diligence" },
        "governance": { "score": 65, "assessment": "Board diversity", "gaps": "" }
    });
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "parts": [{ "text": report.to_string() }] } }]
    }))
}

fn analyzer_for(config: &Config) -> Arc<GeminiAnalyzer> {
    Arc::new(GeminiAnalyzer::from_config(&config.analyzer, "test-key").expect("analyzer client"))
}

fn pipeline_for(config: &Config) -> Pipeline {
    let renderer = HttpRenderer::from_config(&config.crawler, &config.user_agent).expect("renderer");
    Pipeline::new(config.clone(), Arc::new(renderer))
}

#[tokio::test]
async fn test_end_to_end_run() {
    let site = start_site().await;
    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .respond_with(analyzer_reply())
        .expect(2)
        .mount(&api)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), &api.uri());
    let archive = open_archive(&dir.path().join("archive.db")).unwrap();

    let mut pipeline = pipeline_for(&config)
        .with_analyzer(analyzer_for(&config))
        .with_archive(Box::new(archive), "cfg-hash");

    let seed = format!("{}/", site.uri());
    let summary = pipeline.run(&seed).await.expect("run failed");

    assert_eq!(summary.pages_crawled, 3);
    assert_eq!(summary.pages_analyzed, 2);
    assert_eq!(summary.pages_skipped, 1);
    assert_eq!(summary.analysis_failures, 0);
    assert_eq!(summary.crawl.render_failures, 1);

    let urls: Vec<&str> = summary.reports.iter().map(|r| r.url.as_str()).collect();
    let sustainability = format!("{}/sustainability", site.uri());
    assert_eq!(urls, vec![seed.as_str(), sustainability.as_str()]);
    assert!(summary.reports.iter().all(|r| !r.timestamp.is_empty()));
    assert_eq!(summary.reports[0].governance.gaps, None);

    // JSON export holds the run's reports in crawl order
    let json = std::fs::read_to_string(dir.path().join("results.json")).unwrap();
    let exported: Vec<AnalysisReport> = serde_json::from_str(&json).unwrap();
    assert_eq!(exported, summary.reports);

    // Master document lists the newest report first
    let document = std::fs::read_to_string(dir.path().join("report.md")).unwrap();
    assert!(document.starts_with("# ESG Master Report"));
    let newest = document.find(sustainability.as_str()).unwrap();
    let oldest = document.find(&format!("**Target URL**: {}\n", seed)).unwrap();
    assert!(newest < oldest);

    // Archive records the completed run and both reports
    let archive = open_archive(&dir.path().join("archive.db")).unwrap();
    let stats = archive.statistics().unwrap();
    assert_eq!(stats.total_runs, 1);
    assert_eq!(stats.completed_runs, 1);
    assert_eq!(stats.total_reports, 2);
    let run = stats.latest_run.unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "cfg-hash");
    assert_eq!(run.seed_url, seed);
}

#[tokio::test]
async fn test_document_accumulates_across_runs() {
    let site = start_site().await;
    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .respond_with(analyzer_reply())
        .mount(&api)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path(), &api.uri());
    let seed = format!("{}/", site.uri());

    for _ in 0..2 {
        let archive = open_archive(&dir.path().join("archive.db")).unwrap();
        let mut pipeline = pipeline_for(&config)
            .with_analyzer(analyzer_for(&config))
            .with_archive(Box::new(archive), "cfg-hash");
        pipeline.run(&seed).await.expect("run failed");
    }

    let document = std::fs::read_to_string(dir.path().join("report.md")).unwrap();
    assert_eq!(document.matches("## Corp AG").count(), 4);

    // The JSON export only covers the latest run
    let json = std::fs::read_to_string(dir.path().join("results.json")).unwrap();
    let exported: Vec<AnalysisReport> = serde_json::from_str(&json).unwrap();
    assert_eq!(exported.len(), 2);

    let archive = open_archive(&dir.path().join("archive.db")).unwrap();
    let stats = archive.statistics().unwrap();
    assert_eq!(stats.total_runs, 2);
    assert_eq!(stats.total_reports, 4);
    assert_eq!(stats.distinct_urls, 2);
}

#[tokio::test]
async fn test_exhausted_quota_yields_no_reports() {
    let site = start_site().await;
    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED" }
        })))
        .expect(4)
        .mount(&api)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path(), &api.uri());
    config.output.database_path = None;

    let controller = RetryController::new(
        analyzer_for(&config),
        RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(5),
            max_jitter: Duration::ZERO,
        },
        config.analyzer.max_input_chars,
    );
    let mut pipeline = pipeline_for(&config).with_retry_controller(controller);

    let summary = pipeline.run(&format!("{}/", site.uri())).await.expect("run failed");

    assert_eq!(summary.pages_analyzed, 2);
    assert_eq!(summary.analysis_failures, 2);
    assert!(summary.reports.is_empty());
    assert_eq!(summary.run_id, None);

    let json = std::fs::read_to_string(dir.path().join("results.json")).unwrap();
    assert_eq!(json.trim(), "[]");
    let document = std::fs::read_to_string(dir.path().join("report.md")).unwrap();
    assert!(document.contains("_No reports yet._"));
}
