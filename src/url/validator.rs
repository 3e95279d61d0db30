//! Link eligibility checks
//!
//! A discovered link may enter the frontier only when it lives on the same
//! host as the session origin and does not point at a static asset.

use crate::url::domain::same_origin_host;
use url::Url;

/// Path extensions that never carry analyzable content
const NON_CONTENT_EXTENSIONS: &[&str] = &[
    // Images
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg", ".ico", ".bmp",
    // Stylesheets and scripts
    ".css", ".js", ".mjs",
    // Archives
    ".zip", ".tar", ".gz", ".tgz", ".rar", ".7z",
];

/// Decides whether a discovered URL may be enqueued for a session
///
/// Both arguments are parsed; a URL that fails to parse is never eligible.
/// This is a pure function: no normalization, no network access.
///
/// # Examples
///
/// ```
/// use esg_scout::url::is_eligible;
///
/// let origin = "https://a.example/x";
/// assert!(is_eligible("https://a.example/y", origin));
/// assert!(!is_eligible("https://b.example/y", origin));
/// assert!(!is_eligible("https://a.example/y.png", origin));
/// ```
pub fn is_eligible(candidate: &str, origin: &str) -> bool {
    match (Url::parse(candidate), Url::parse(origin)) {
        (Ok(candidate), Ok(origin)) => is_eligible_url(&candidate, &origin),
        _ => false,
    }
}

/// Parsed-URL form of [`is_eligible`], used by the crawl driver
pub fn is_eligible_url(candidate: &Url, origin: &Url) -> bool {
    if !same_origin_host(candidate, origin) {
        return false;
    }

    !has_non_content_extension(candidate)
}

fn has_non_content_extension(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    NON_CONTENT_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
