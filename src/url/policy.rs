use url::Url;

/// File extensions that are never enqueued
///
/// Documents and machine-readable assets that a text crawl has no use for.
pub const SKIP_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "css", "js", "json", "xml"];

/// Maximum length of a URL accepted into the crawl queue
pub const MAX_URL_LENGTH: usize = 500;

/// Decides whether a discovered URL belongs to the crawl scope of a site
///
/// All checks are conjunctive:
///
/// 1. Scheme is http or https
/// 2. Serialized URL is at most [`MAX_URL_LENGTH`] bytes
/// 3. The path's file extension is not in [`SKIP_EXTENSIONS`]
/// 4. The host is the site's own host, or matches one of the project's base
///    domains exactly or as a proper subdomain
///
/// # Arguments
///
/// * `url` - The candidate URL (already normalized)
/// * `site_host` - Host of the site being crawled
/// * `base_domains` - The owning project's domain allow-list
pub fn in_scope(url: &Url, site_host: &str, base_domains: &[String]) -> bool {
    if url.scheme() != "http" && url.scheme() != "https" {
        return false;
    }

    if url.as_str().len() > MAX_URL_LENGTH {
        return false;
    }

    if has_skipped_extension(url) {
        return false;
    }

    let host = match url.host_str() {
        Some(h) => h,
        None => return false,
    };

    host_allowed(host, site_host, base_domains)
}

/// Checks whether the URL's path ends in a blocklisted file extension
pub fn has_skipped_extension(url: &Url) -> bool {
    let last_segment = url
        .path_segments()
        .and_then(|segments| segments.last())
        .unwrap_or("");

    match last_segment.rsplit_once('.') {
        Some((name, ext)) if !name.is_empty() && !ext.is_empty() => {
            SKIP_EXTENSIONS.contains(&ext.to_lowercase().as_str())
        }
        _ => false,
    }
}

/// Checks the domain boundary rule
///
/// A host is allowed when it equals the site's host, equals a base domain,
/// or is a proper subdomain of one (suffix match on ".domain", so
/// `evil-example.com` does not match the base domain `example.com`).
fn host_allowed(host: &str, site_host: &str, base_domains: &[String]) -> bool {
    if host.eq_ignore_ascii_case(site_host) {
        return true;
    }

    let host = host.to_lowercase();
    base_domains.iter().any(|domain| {
        let domain = domain.to_lowercase();
        host == domain || host.ends_with(&format!(".{}", domain))
    })
}
