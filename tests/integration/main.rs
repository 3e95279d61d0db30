//! Integration tests for ESG Scout
//!
//! Mock HTTP servers stand in for the crawled site and the analyzer API.

mod analyzer_tests;
mod crawl_tests;
mod pipeline_tests;

use wiremock::{Mock, MockServer, ResponseTemplate};
use wiremock::matchers::{method, path};

/// Mounts an HTML page at `page_path`
pub async fn mount_html(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body, "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Builds a page with the given anchors and optional padding text
pub fn html_page(title: &str, links: &[&str], padding: usize) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><h1>{}</h1><p>{}</p>{}</body></html>",
        title,
        title,
        "Our climate targets cover Scope 1, 2 and 3 emissions. ".repeat(padding),
        anchors
    )
}
