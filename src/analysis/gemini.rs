//! Gemini `generateContent` client implementing [`Analyzer`]

use crate::analysis::analyzer::{AnalysisRequest, Analyzer, AnalyzerError, AnalyzerResponse};
use crate::config::AnalyzerConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Status string Google APIs use for quota errors
const RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";

/// Analyzer backed by the Gemini REST API
pub struct GeminiAnalyzer {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiAnalyzer {
    pub fn new(client: Client, config: &AnalyzerConfig, api_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
        }
    }

    /// Builds an analyzer with its own HTTP client
    pub fn from_config(
        config: &AnalyzerConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(300))
            .build()?;
        Ok(Self::new(client, config, api_key))
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

/// Builds the analysis prompt for one page
///
/// The prompt pins the exact JSON shape expected back, with the page URL and
/// request timestamp already filled in.
pub fn build_prompt(request: &AnalysisRequest<'_>) -> String {
    format!(
        r#"You are an expert in ESG (Environmental, Social, and Governance) compliance, focusing on EU regulations such as the EU Taxonomy, SFDR (Sustainable Finance Disclosure Regulation) and CSRD (Corporate Sustainability Reporting Directive).

Analyze the following text scraped from a company's website. Categorize the information into the Environmental, Social and Governance pillars and evaluate it for alignment with EU standards.

For each pillar provide:
1. "score": an integer from 0 to 100 indicating how well the text demonstrates compliance or disclosure in this area.
2. "assessment": a brief summary of the findings, citing specific topics mentioned (e.g. "Scope 3 emissions", "Board diversity", "Human rights due diligence").
3. "gaps": information required by EU regulations that appears to be missing.

Return STRICTLY one JSON object with this structure:
{{
    "company_name": "Inferred company name or 'Unknown'",
    "url": "{url}",
    "summary": "Overall ESG compliance summary",
    "environmental": {{ "score": 0, "assessment": "...", "gaps": "..." }},
    "social": {{ "score": 0, "assessment": "...", "gaps": "..." }},
    "governance": {{ "score": 0, "assessment": "...", "gaps": "..." }},
    "timestamp": "{timestamp}"
}}

Text:
{text}
"#,
        url = request.url,
        timestamp = request.timestamp(),
        text = request.text,
    )
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
    status: Option<String>,
}

#[async_trait]
impl Analyzer for GeminiAnalyzer {
    async fn analyze(&self, request: &AnalysisRequest<'_>) -> AnalyzerResponse {
        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(request) }] }],
            "generationConfig": { "responseMimeType": "application/json" },
        });

        tracing::debug!(
            "Submitting {} bytes from {} to {}",
            request.text.len(),
            request.url,
            self.model
        );

        let response = match self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return AnalyzerResponse::Fatal(AnalyzerError::Transport(e.to_string())),
        };

        let status = response.status();
        let payload = match response.text().await {
            Ok(payload) => payload,
            Err(e) => return AnalyzerResponse::Fatal(AnalyzerError::Transport(e.to_string())),
        };

        if !status.is_success() {
            return classify_error(status, &payload);
        }

        match candidate_text(&payload) {
            Ok(text) => AnalyzerResponse::Success(text),
            Err(e) => AnalyzerResponse::Fatal(e),
        }
    }
}

fn classify_error(status: StatusCode, payload: &str) -> AnalyzerResponse {
    let api_error = serde_json::from_str::<ErrorEnvelope>(payload)
        .ok()
        .map(|envelope| envelope.error);

    let exhausted = api_error
        .as_ref()
        .and_then(|e| e.status.as_deref())
        .map_or(false, |s| s == RESOURCE_EXHAUSTED);

    let message = api_error
        .and_then(|e| e.message)
        .unwrap_or_else(|| payload.chars().take(200).collect());

    if status == StatusCode::TOO_MANY_REQUESTS || exhausted {
        AnalyzerResponse::RateLimited(message)
    } else {
        AnalyzerResponse::Fatal(AnalyzerError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

/// Joins the text parts of the first candidate
fn candidate_text(payload: &str) -> Result<String, AnalyzerError> {
    let parsed: GenerateContentResponse = serde_json::from_str(payload)
        .map_err(|e| AnalyzerError::MalformedResponse(e.to_string()))?;

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AnalyzerError::MalformedResponse(
            "response contained no candidate text".to_string(),
        ));
    }

    Ok(text)
}
