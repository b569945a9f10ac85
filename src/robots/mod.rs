//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! Any failure to obtain robots.txt results in a permissive ruleset for that domain.

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::{product_token, ParsedRobots};

/// Fetches robots.txt for a domain
///
/// # Arguments
///
/// * `client` - HTTP client carrying the crawler's User-Agent and timeout
/// * `scheme` - `http` or `https`, taken from the URL being checked
/// * `domain` - Domain key (host plus optional port)
///
/// # Returns
///
/// The parsed rules, or [`ParsedRobots::allow_all`] on network errors and
/// non-success status codes.
pub async fn fetch_robots(client: &reqwest::Client, scheme: &str, domain: &str) -> ParsedRobots {
    let robots_url = format!("{}://{}/robots.txt", scheme, domain);

    let response = match client.get(&robots_url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("Failed to fetch {}: {}, allowing all", robots_url, e);
            return ParsedRobots::allow_all();
        }
    };

    if !response.status().is_success() {
        tracing::debug!(
            "{} returned HTTP {}, allowing all",
            robots_url,
            response.status().as_u16()
        );
        return ParsedRobots::allow_all();
    }

    match response.text().await {
        Ok(body) => {
            tracing::debug!("Loaded robots.txt for {} ({} bytes)", domain, body.len());
            ParsedRobots::from_content(&body)
        }
        Err(e) => {
            tracing::debug!("Failed to read {}: {}, allowing all", robots_url, e);
            ParsedRobots::allow_all()
        }
    }
}
