use clap::Parser;
use std::time::Duration;

use crate::hn_client::DEFAULT_API_BASE;

pub const DEFAULT_QUERY: &str = "react";
pub const DEFAULT_HITS_PER_PAGE: u32 = 8;

/// Native Hacker News story search.
#[derive(Parser, Debug, Clone)]
#[command(name = "hn_search", version, about)]
pub struct Config {
    /// Base URL of the Algolia HN API
    #[arg(long, env = "HN_SEARCH_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Query searched at startup
    #[arg(long, env = "HN_SEARCH_QUERY", default_value = DEFAULT_QUERY)]
    pub query: String,

    /// Stories requested per page
    #[arg(
        long,
        env = "HN_SEARCH_HITS_PER_PAGE",
        default_value_t = DEFAULT_HITS_PER_PAGE,
        value_parser = clap::value_parser!(u32).range(1..=1000)
    )]
    pub hits_per_page: u32,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HN_SEARCH_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Start with the light theme (overrides the saved preference)
    #[arg(long)]
    pub light: bool,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_public_api() {
        let config = Config::try_parse_from(["hn_search"]).unwrap();
        assert_eq!(config.api_base, "https://hn.algolia.com/api/v1");
        assert_eq!(config.query, "react");
        assert_eq!(config.hits_per_page, 8);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(!config.light);
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "hn_search",
            "--query",
            "rust async",
            "--hits-per-page",
            "20",
            "--api-base",
            "http://localhost:9000",
            "--light",
        ])
        .unwrap();
        assert_eq!(config.query, "rust async");
        assert_eq!(config.hits_per_page, 20);
        assert_eq!(config.api_base, "http://localhost:9000");
        assert!(config.light);
    }

    #[test]
    fn rejects_zero_hits_per_page() {
        assert!(Config::try_parse_from(["hn_search", "--hits-per-page", "0"]).is_err());
    }
}
