use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use esg_scout::url::extract_domain;
///
/// let url = Url::parse("https://corp.example/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("corp.example".to_string()));
///
/// let url = Url::parse("https://CORP.EXAMPLE/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("corp.example".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true when both URLs share the same network location
///
/// Hosts must be exactly equal and the effective ports must match
/// (`https://a.example` and `https://a.example:443` are the same location).
/// Subdomains never match their parent.
pub fn same_origin_host(candidate: &Url, origin: &Url) -> bool {
    match (extract_domain(candidate), extract_domain(origin)) {
        (Some(a), Some(b)) => {
            a == b && candidate.port_or_known_default() == origin.port_or_known_default()
        }
        _ => false,
    }
}
