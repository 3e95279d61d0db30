//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small site and run full crawl
//! sessions through the HTTP renderer.

use crate::{html_page, mount_html};
use esg_scout::config::{CrawlerConfig, UserAgentConfig};
use esg_scout::crawler::{Coordinator, HttpRenderer, RenderError, Renderer};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config(max_depth: u32) -> CrawlerConfig {
    CrawlerConfig {
        max_depth,
        request_timeout: 2_000,
        politeness_min: 0,
        politeness_max: 0,
        ..CrawlerConfig::default()
    }
}

fn test_user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

fn coordinator(max_depth: u32) -> Coordinator {
    let config = create_test_config(max_depth);
    let renderer = HttpRenderer::from_config(&config, &test_user_agent())
        .expect("Failed to build renderer");
    Coordinator::new(config, Arc::new(renderer))
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        html_page(
            "Home",
            &[
                "/esg",
                "/climate#targets",
                &format!("{}/governance", base_url),
                "/logo.png",
                "/styles/site.css",
                "https://other.invalid/esg",
                "mailto:ir@corp.example",
            ],
            1,
        ),
    )
    .await;
    mount_html(&mock_server, "/esg", html_page("ESG", &["/esg/deep"], 1)).await;
    mount_html(&mock_server, "/climate", html_page("Climate", &["/"], 1)).await;
    mount_html(&mock_server, "/governance", html_page("Governance", &[], 1)).await;

    // Links on depth-1 pages are never followed at max depth 1
    Mock::given(method("GET"))
        .and(path("/esg/deep"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let outcome = coordinator(1)
        .crawl(&format!("{}/", base_url))
        .await
        .expect("Crawl failed");

    let paths: Vec<(String, u32)> = outcome
        .pages
        .iter()
        .map(|p| (Url::parse(&p.url).unwrap().path().to_string(), p.depth))
        .collect();
    assert_eq!(
        paths,
        vec![
            ("/".to_string(), 0),
            ("/esg".to_string(), 1),
            ("/climate".to_string(), 1),
            ("/governance".to_string(), 1),
        ]
    );
    assert!(outcome.pages[1].rendered_content.contains("<h1>ESG</h1>"));
    assert_eq!(outcome.stats.pages_rendered, 4);
    assert_eq!(outcome.stats.render_failures, 0);
}

#[tokio::test]
async fn test_failed_pages_do_not_stop_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        html_page("Home", &["/missing", "/report.pdf", "/ok"], 1),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"%PDF-1.7".to_vec(), "application/pdf"),
        )
        .mount(&mock_server)
        .await;
    mount_html(&mock_server, "/ok", html_page("OK", &["/missing"], 1)).await;

    let outcome = coordinator(2)
        .crawl(&format!("{}/", base_url))
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.pages.len(), 2);
    assert_eq!(outcome.stats.render_failures, 2);

    // The failed page is visited once even though /ok links to it again
    let requests = mock_server.received_requests().await.unwrap();
    let missing = requests.iter().filter(|r| r.url.path() == "/missing").count();
    assert_eq!(missing, 1);
}

#[tokio::test]
async fn test_renderer_sends_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header(
            "user-agent",
            "TestBot/1.0.0 (+https://example.com/contact; test@example.com)",
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body>ok</body></html>", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let renderer = HttpRenderer::from_config(&create_test_config(0), &test_user_agent()).unwrap();
    let url = Url::parse(&format!("{}/", mock_server.uri())).unwrap();

    let page = renderer.render(&url, Duration::from_secs(2)).await.unwrap();
    assert!(page.html.contains("ok"));
}

#[tokio::test]
async fn test_renderer_follows_redirects() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new", base_url).as_str()),
        )
        .mount(&mock_server)
        .await;
    mount_html(&mock_server, "/new", html_page("New", &[], 1)).await;

    let renderer = HttpRenderer::from_config(&create_test_config(0), &test_user_agent()).unwrap();
    let url = Url::parse(&format!("{}/old", base_url)).unwrap();

    let page = renderer.render(&url, Duration::from_secs(2)).await.unwrap();
    assert_eq!(page.final_url.path(), "/new");
}

#[tokio::test]
async fn test_renderer_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html></html>", "text/html")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let renderer = HttpRenderer::from_config(&create_test_config(0), &test_user_agent()).unwrap();
    let url = Url::parse(&format!("{}/slow", mock_server.uri())).unwrap();

    let result = renderer.render(&url, Duration::from_millis(200)).await;
    assert!(matches!(result, Err(RenderError::Timeout { .. })));

    let page = renderer.render(&url, Duration::from_secs(10)).await.unwrap();
    assert_eq!(page.html, "<html></html>");
}

#[tokio::test]
async fn test_renderer_status_and_content_type_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("{}", "application/json"),
        )
        .mount(&mock_server)
        .await;

    let renderer = HttpRenderer::from_config(&create_test_config(0), &test_user_agent()).unwrap();
    let base = mock_server.uri();

    let gone = renderer
        .render(&Url::parse(&format!("{}/gone", base)).unwrap(), Duration::from_secs(2))
        .await;
    assert!(matches!(gone, Err(RenderError::Status { status: 410, .. })));

    let json = renderer
        .render(&Url::parse(&format!("{}/data.json", base)).unwrap(), Duration::from_secs(2))
        .await;
    assert!(matches!(json, Err(RenderError::ContentMismatch { .. })));
}

#[tokio::test]
async fn test_links_follow_redirect_target() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/about/", base_url).as_str()),
        )
        .mount(&mock_server)
        .await;
    mount_html(&mock_server, "/about/", html_page("About", &["team"], 1)).await;
    mount_html(&mock_server, "/about/team", html_page("Team", &[], 1)).await;
    Mock::given(method("GET"))
        .and(path("/team"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let outcome = coordinator(1)
        .crawl(&format!("{}/about", base_url))
        .await
        .expect("Crawl failed");

    let paths: Vec<String> = outcome
        .pages
        .iter()
        .map(|p| Url::parse(&p.url).unwrap().path().to_string())
        .collect();
    assert_eq!(paths, vec!["/about", "/about/team"]);
}
