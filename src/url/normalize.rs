use crate::{LoupeError, Result};
use url::Url;

/// Schemes that mark a link as non-navigational
const IGNORED_SCHEMES: &[&str] = &["javascript", "mailto", "tel", "data"];

/// Normalizes a URL into its canonical crawl identity
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject schemes other than http/https
/// 3. Remove the fragment (everything after #)
///
/// The host is lowercased by the parser, and the query string is kept as-is:
/// two URLs that differ only in fragment are the same page, but two URLs that
/// differ in query parameters are not.
///
/// # Arguments
///
/// * `url_str` - The URL string to normalize
///
/// # Returns
///
/// * `Ok(Url)` - Normalized URL
/// * `Err(LoupeError)` - Failed to parse, or unsupported scheme
///
/// # Examples
///
/// ```
/// use loupe::url::normalize_url;
///
/// let url = normalize_url("https://Example.COM/page#section").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url> {
    let mut url = Url::parse(url_str)?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(LoupeError::UnsupportedScheme(url.scheme().to_string()));
    }

    url.set_fragment(None);

    Ok(url)
}

/// Resolves an href attribute found on a page against the page's URL
///
/// Returns None for links that cannot lead to a crawlable page: empty hrefs,
/// pure fragments, javascript:/mailto:/tel:/data: pseudo-links, unparseable
/// references, and resolved URLs outside http/https.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_lowercase();
    for scheme in IGNORED_SCHEMES {
        if lower.starts_with(&format!("{}:", scheme)) {
            return None;
        }
    }

    let mut url = base.join(href).ok()?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    url.set_fragment(None);

    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/docs/page.html").unwrap()
    }

    #[test]
    fn test_remove_fragment() {
        let result = normalize_url("https://example.com/page#section").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_lowercase_host() {
        let result = normalize_url("https://EXAMPLE.COM/Page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_query_preserved() {
        let result = normalize_url("https://example.com/page?b=2&a=1").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page?b=2&a=1");
    }

    #[test]
    fn test_invalid_scheme() {
        let result = normalize_url("ftp://example.com/file");
        assert!(matches!(result, Err(LoupeError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_malformed_url() {
        assert!(normalize_url("not a url").is_err());
    }

    #[test]
    fn test_resolve_relative() {
        let url = resolve_href(&base(), "other.html").unwrap();
        assert_eq!(url.as_str(), "https://example.com/docs/other.html");
    }

    #[test]
    fn test_resolve_root_relative() {
        let url = resolve_href(&base(), "/about").unwrap();
        assert_eq!(url.as_str(), "https://example.com/about");
    }

    #[test]
    fn test_resolve_absolute() {
        let url = resolve_href(&base(), "https://other.org/page").unwrap();
        assert_eq!(url.as_str(), "https://other.org/page");
    }

    #[test]
    fn test_resolve_strips_fragment() {
        let url = resolve_href(&base(), "/about#team").unwrap();
        assert_eq!(url.as_str(), "https://example.com/about");
    }

    #[test]
    fn test_resolve_skips_pseudo_links() {
        assert!(resolve_href(&base(), "").is_none());
        assert!(resolve_href(&base(), "   ").is_none());
        assert!(resolve_href(&base(), "#top").is_none());
        assert!(resolve_href(&base(), "javascript:void(0)").is_none());
        assert!(resolve_href(&base(), "JavaScript:alert(1)").is_none());
        assert!(resolve_href(&base(), "mailto:someone@example.com").is_none());
        assert!(resolve_href(&base(), "tel:+33123456789").is_none());
        assert!(resolve_href(&base(), "data:text/plain,hello").is_none());
    }

    #[test]
    fn test_resolve_skips_non_http_result() {
        assert!(resolve_href(&base(), "ftp://example.com/file").is_none());
    }

    #[test]
    fn test_resolve_protocol_relative() {
        let url = resolve_href(&base(), "//cdn.example.com/lib.html").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/lib.html");
    }
}
