//! Robots.txt handling module
//!
//! Robots handling is advisory and off by default: a crawl run fetches
//! `/robots.txt` once at startup when the site's settings enable it, and a
//! fetch failure of any kind degrades to allow-all rather than aborting
//! the run.

mod rules;

pub use rules::RobotsRules;

use tracing::debug;
use url::Url;

/// Fetches and parses robots.txt for a site
///
/// Builds `{origin}/robots.txt` from the site's base URL and fetches it with
/// the crawl client. Any failure (connection error, non-2xx status,
/// unreadable body, unbuildable URL) yields permissive rules.
///
/// # Arguments
///
/// * `client` - The HTTP client used for the crawl run
/// * `base_url` - The site's base URL
pub async fn fetch_robots(client: &reqwest::Client, base_url: &Url) -> RobotsRules {
    let robots_url = match base_url.join("/robots.txt") {
        Ok(u) => u,
        Err(e) => {
            debug!("Could not build robots.txt URL from {}: {}", base_url, e);
            return RobotsRules::allow_all();
        }
    };

    match client.get(robots_url.as_str()).send().await {
        Ok(response) if response.status().is_success() => match response.text().await {
            Ok(body) => {
                debug!(
                    "Fetched robots.txt from {} ({} bytes)",
                    robots_url,
                    body.len()
                );
                RobotsRules::from_content(&body)
            }
            Err(e) => {
                debug!("Failed to read robots.txt body from {}: {}", robots_url, e);
                RobotsRules::allow_all()
            }
        },
        Ok(response) => {
            debug!(
                "robots.txt at {} returned HTTP {}, allowing all",
                robots_url,
                response.status()
            );
            RobotsRules::allow_all()
        }
        Err(e) => {
            debug!("Failed to fetch robots.txt from {}: {}", robots_url, e);
            RobotsRules::allow_all()
        }
    }
}
