use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for ESG Scout
///
/// Every table is optional; missing keys fall back to their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub analyzer: AnalyzerConfig,
    pub output: OutputConfig,
}

/// Crawl session configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of link hops from the seed URL
    pub max_depth: u32,

    /// Per-render timeout (milliseconds)
    pub request_timeout: u64,

    /// Lower bound of the randomized delay before each render (milliseconds)
    pub politeness_min: u64,

    /// Upper bound of the randomized delay before each render (milliseconds)
    pub politeness_max: u64,

    /// Hard stop for a whole crawl session (seconds)
    pub session_timeout: Option<u64>,

    /// Proxy used by the HTTP renderer
    pub proxy_url: Option<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            request_timeout: 60_000,
            politeness_min: 1_000,
            politeness_max: 3_000,
            session_timeout: None,
            proxy_url: None,
        }
    }
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout)
    }

    pub fn session_timeout(&self) -> Option<Duration> {
        self.session_timeout.map(Duration::from_secs)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,

    /// Email address for crawler-related contact
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "esg-scout".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/esg-scout".to_string(),
            contact_email: "crawler@example.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the user agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Content analyzer configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AnalyzerConfig {
    /// Gemini model name
    pub model: String,

    /// Base URL of the Generative Language API
    pub endpoint: String,

    /// Name of the environment variable holding the API key
    pub api_key_env: String,

    /// Maximum analyzer calls per page when rate limited
    pub max_attempts: u32,

    /// Backoff base delay (milliseconds)
    pub base_delay: u64,

    /// Upper bound of the uniform jitter added to each backoff (milliseconds)
    pub max_jitter: u64,

    /// Text is truncated to this many characters before submission
    pub max_input_chars: usize,

    /// Pages whose rendered content is shorter than this are not analyzed
    pub min_content_length: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            model: "gemini-flash-latest".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            max_attempts: 5,
            base_delay: 10_000,
            max_jitter: 5_000,
            max_input_chars: 30_000,
            min_content_length: 1_000,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path of the JSON report array
    pub json_path: String,

    /// Path of the Markdown master document
    pub document_path: Option<String>,

    /// Path of the SQLite report archive
    pub database_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_path: "results.json".to_string(),
            document_path: None,
            database_path: None,
        }
    }
}
