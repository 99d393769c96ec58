//! Robots.txt rule evaluation
//!
//! This module wraps the robotstxt crate behind a simplified interface for
//! checking URL permissions and reading the Crawl-delay directive.

use robotstxt::DefaultMatcher;
use std::time::Duration;

/// Parsed robots.txt rules for a site
///
/// The rules are advisory: when robots.txt cannot be fetched the crawler
/// proceeds with [`RobotsRules::allow_all`].
#[derive(Debug, Clone)]
pub struct RobotsRules {
    /// Raw robots.txt content (empty string means allow all)
    content: String,
    /// Whether to allow all (true = allow all, false = evaluate content)
    allow_all: bool,
}

impl RobotsRules {
    /// Creates rules from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// Creates permissive rules that allow everything
    ///
    /// Used as the default when robots.txt cannot be fetched or parsed.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - Full URL or path to check (e.g., "/page.html")
    /// * `user_agent` - The user agent string
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.allow_all || self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// Gets the crawl delay for a specific user agent
    ///
    /// The robotstxt crate ignores Crawl-delay, so the directive is parsed
    /// manually. It applies to the most recent User-agent group; a delay for
    /// the specific agent wins over a wildcard delay.
    ///
    /// # Returns
    ///
    /// * `Some(Duration)` - The advertised crawl delay
    /// * `None` - If no crawl delay is specified
    pub fn crawl_delay(&self, user_agent: &str) -> Option<Duration> {
        if self.allow_all || self.content.is_empty() {
            return None;
        }

        let mut current_user_agents: Vec<String> = Vec::new();
        let mut delay_for_wildcard: Option<f64> = None;
        let mut delay_for_agent: Option<f64> = None;

        let normalized_agent = user_agent.to_lowercase();

        for line in self.content.lines() {
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = trimmed.split_once(':') {
                let key = key.trim().to_lowercase();
                let value = value.trim();

                match key.as_str() {
                    "user-agent" => {
                        // Multiple User-agent lines belong to the same group
                        current_user_agents.push(value.to_lowercase());
                    }
                    "crawl-delay" => {
                        if let Ok(delay) = value.parse::<f64>() {
                            if delay.is_finite()
                                && delay >= 0.0
                                && current_user_agents
                                    .iter()
                                    .any(|ua| ua == "*" || normalized_agent.contains(ua))
                            {
                                if current_user_agents.contains(&"*".to_string()) {
                                    delay_for_wildcard = Some(delay);
                                } else {
                                    delay_for_agent = Some(delay);
                                }
                            }
                        }
                        // The next User-agent directive starts a new group
                        current_user_agents.clear();
                    }
                    _ => {
                        // Allow, Disallow, Sitemap and friends are handled by
                        // the matcher, not here
                    }
                }
            }
        }

        delay_for_agent
            .or(delay_for_wildcard)
            .map(Duration::from_secs_f64)
    }
}
