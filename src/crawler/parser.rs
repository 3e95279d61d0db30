//! HTML parser for extracting links, titles and analyzable text
//!
//! Link extraction feeds the frontier; text extraction feeds the analyzer.
//! Both are lenient: html5ever recovers from any input, so malformed markup
//! simply yields fewer links or less text, never an error.

use crate::url::strip_fragment;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

/// Subtrees that never contribute analyzable text
const NON_CONTENT_ELEMENTS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "noscript", "iframe", "svg",
];

/// Extracts all followable links from anchor elements
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document, resolved against `base_url`
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Empty and fragment-only hrefs
/// - Anything that is not HTTP(S) after resolution
///
/// Fragments are stripped from every returned URL. Duplicates are kept; the
/// frontier is responsible for de-duplication.
///
/// # Example
///
/// ```
/// use esg_scout::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/esg#env">ESG</a></body></html>"#;
/// let base_url = Url::parse("https://corp.example/").unwrap();
/// let links = extract_links(html, &base_url);
/// assert_eq!(links[0].as_str(), "https://corp.example/esg");
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Extracts the page title from the HTML document
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Reduces rendered HTML to the text worth sending to the analyzer
///
/// Script, style and navigation chrome are dropped. Each remaining text
/// node is trimmed line by line, runs separated by two or more spaces are
/// split onto their own lines, and blank lines are removed.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();
    collect_text(document.root_element(), &mut raw);

    raw.lines()
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push('\n');
            }
            Node::Element(el) if NON_CONTENT_ELEMENTS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
            }
            _ => {}
        }
    }
}

/// Resolves a link href to an absolute, fragment-free URL
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
        Some(strip_fragment(&absolute_url))
    } else {
        None
    }
}
