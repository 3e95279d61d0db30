use crate::UrlError;
use url::Url;

/// Parses and normalizes a URL for use as a frontier key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an HTTP or HTTPS scheme
/// 3. Require a host
/// 4. Remove the fragment (everything after #)
///
/// Nothing else is rewritten: paths, queries and the host itself are kept
/// as parsed, so that host equality stays strict.
///
/// # Examples
///
/// ```
/// use esg_scout::url::normalize_url;
///
/// let url = normalize_url("https://corp.example/esg#scope-3").unwrap();
/// assert_eq!(url.as_str(), "https://corp.example/esg");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    Ok(strip_fragment(&url))
}

/// Returns a copy of the URL without its fragment
pub fn strip_fragment(url: &Url) -> Url {
    let mut stripped = url.clone();
    stripped.set_fragment(None);
    stripped
}
