use crate::{UrlError, UrlResult};
use url::Url;

/// Extracts the host from a URL string
///
/// The `url` crate already lowercases hosts, so the result can be compared
/// against a lowercase scope domain directly. Returns `None` for strings
/// that do not parse or carry no host.
///
/// # Examples
///
/// ```
/// use tidecrawl::url::extract_host;
///
/// assert_eq!(extract_host("https://EXAMPLE.com/path"), Some("example.com".to_string()));
/// assert_eq!(extract_host("https://example.com:8080/"), Some("example.com".to_string()));
/// assert_eq!(extract_host("not a url"), None);
/// ```
pub fn extract_host(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

/// Returns true if the link's host contains `scope_domain` as a substring
///
/// This is a plain substring test: `notexample.com` matches the scope
/// `example.com`, and so does `example.com.evil.net`.
pub fn is_in_scope(link: &str, scope_domain: &str) -> bool {
    match extract_host(link) {
        Some(host) => host.contains(&scope_domain.to_lowercase()),
        None => false,
    }
}

/// Parses a URL and requires an http(s) scheme and a host
pub fn parse_http_url(url: &str) -> UrlResult<Url> {
    let parsed = Url::parse(url).map_err(|e| UrlError::Parse(e.to_string()))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(UrlError::InvalidScheme(parsed.scheme().to_string()));
    }

    if parsed.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(parsed)
}

/// Derives the crawl's scope domain from its start URL
///
/// The host is lowercased and a leading `www.` dropped, so a crawl seeded
/// at `https://www.dlsu.edu.ph` also admits `enroll.dlsu.edu.ph`.
pub fn derive_scope_domain(start_url: &str) -> UrlResult<String> {
    let parsed = parse_http_url(start_url)?;
    let host = parsed.host_str().ok_or(UrlError::MissingHost)?.to_lowercase();

    Ok(match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    })
}
