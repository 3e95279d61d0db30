//! Integration tests for the Gemini analyzer and the retry controller
//!
//! A wiremock server plays the Generative Language API.

use esg_scout::analysis::{
    AnalysisFailure, AnalysisRequest, Analyzer, AnalyzerError, AnalyzerResponse, GeminiAnalyzer,
    RetryController, RetryPolicy,
};
use esg_scout::config::AnalyzerConfig;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/models/gemini-test:generateContent";

fn analyzer_for(server: &MockServer) -> GeminiAnalyzer {
    let config = AnalyzerConfig {
        endpoint: server.uri(),
        model: "gemini-test".to_string(),
        ..AnalyzerConfig::default()
    };
    GeminiAnalyzer::from_config(&config, "test-key").expect("Failed to build analyzer")
}

fn candidate_body(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

fn report_json(url: &str) -> String {
    json!({
        "company_name": "Corp AG",
        "url": url,
        "summary": "Solid climate disclosure, thin on social metrics.",
        "environmental": { "score": 80, "assessment": "Scope 1-3 reported", "gaps": "No transition plan" },
        "social": { "score": 45, "assessment": "Basic H&S data", "gaps": "No human rights due diligence" },
        "governance": { "score": 70, "assessment": "Independent board", "gaps": null },
        "timestamp": "2024-05-01T10:00:00Z"
    })
    .to_string()
}

fn quota_error(code: u16) -> ResponseTemplate {
    ResponseTemplate::new(code).set_body_json(json!({
        "error": {
            "code": code,
            "message": "Quota exceeded for quota metric 'Generate Content API requests per minute'",
            "status": "RESOURCE_EXHAUSTED"
        }
    }))
}

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(5),
        max_jitter: Duration::ZERO,
    }
}

#[tokio::test]
async fn test_successful_generation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("{\"ok\": true}")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let analyzer = analyzer_for(&mock_server);
    let request = AnalysisRequest::new("https://corp.example/esg", "We publish a CSRD report.");

    let response = analyzer.analyze(&request).await;
    assert_eq!(response, AnalyzerResponse::Success("{\"ok\": true}".to_string()));
}

#[tokio::test]
async fn test_prompt_carries_page_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("{}")))
        .mount(&mock_server)
        .await;

    let analyzer = analyzer_for(&mock_server);
    let request = AnalysisRequest::new("https://corp.example/esg", "Board diversity at 40%.");
    analyzer.analyze(&request).await;

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("Board diversity at 40%."));
    assert!(prompt.contains("https://corp.example/esg"));
}

#[tokio::test]
async fn test_rate_limit_responses() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(quota_error(429))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    // Some gateways report quota exhaustion with a non-429 status
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(quota_error(403))
        .mount(&mock_server)
        .await;

    let analyzer = analyzer_for(&mock_server);
    let request = AnalysisRequest::new("https://corp.example/", "text");

    for _ in 0..2 {
        let response = analyzer.analyze(&request).await;
        assert!(
            matches!(response, AnalyzerResponse::RateLimited(ref message) if message.contains("Quota exceeded")),
            "unexpected response: {:?}",
            response
        );
    }
}

#[tokio::test]
async fn test_fatal_responses() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" }
        })))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&mock_server)
        .await;

    let analyzer = analyzer_for(&mock_server);
    let request = AnalysisRequest::new("https://corp.example/", "text");

    assert_eq!(
        analyzer.analyze(&request).await,
        AnalyzerResponse::Fatal(AnalyzerError::Status {
            status: 400,
            message: "API key not valid".to_string(),
        })
    );
    assert!(matches!(
        analyzer.analyze(&request).await,
        AnalyzerResponse::Fatal(AnalyzerError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_retry_recovers_after_rate_limits() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(quota_error(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidate_body(&format!("```json\n{}\n```", report_json("https://corp.example/esg")))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let controller = RetryController::new(Arc::new(analyzer_for(&mock_server)), fast_policy(5), 30_000);

    let report = controller
        .try_analyze("We report Scope 1, 2 and 3 emissions.", "https://corp.example/esg")
        .await
        .expect("Analysis should succeed on the third attempt");

    assert_eq!(report.company_name, "Corp AG");
    assert_eq!(report.environmental.score, 80);
    assert_eq!(report.governance.gaps, None);
}

#[tokio::test]
async fn test_retry_gives_up_after_budget() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(quota_error(429))
        .expect(6)
        .mount(&mock_server)
        .await;

    let controller = RetryController::new(Arc::new(analyzer_for(&mock_server)), fast_policy(3), 30_000);

    let result = controller.try_analyze("text", "https://corp.example/").await;
    assert!(matches!(result, Err(AnalysisFailure::QuotaExhausted { attempts: 3 })));

    assert!(controller.analyze_with_retry("text", "https://corp.example/").await.is_none());
}

#[tokio::test]
async fn test_fatal_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream failure"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let controller = RetryController::new(Arc::new(analyzer_for(&mock_server)), fast_policy(5), 30_000);

    let result = controller.try_analyze("text", "https://corp.example/").await;
    assert!(matches!(
        result,
        Err(AnalysisFailure::Analyzer(AnalyzerError::Status { status: 500, .. }))
    ));
}

#[tokio::test]
async fn test_invalid_report_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("Sorry, I cannot help.")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let controller = RetryController::new(Arc::new(analyzer_for(&mock_server)), fast_policy(5), 30_000);

    let result = controller.try_analyze("text", "https://corp.example/").await;
    assert!(matches!(result, Err(AnalysisFailure::Decode(_))));
}
