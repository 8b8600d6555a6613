// src/config/service.rs
//! Runtime knobs for the service, read from the environment (`.env` in dev).

use std::time::Duration;

pub const DEFAULT_FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1";

pub const ENV_FINNHUB_API_KEY: &str = "FINNHUB_API_KEY";
pub const ENV_FINNHUB_BASE_URL: &str = "FINNHUB_BASE_URL";
pub const ENV_REFRESH_INTERVAL_SECS: &str = "REFRESH_INTERVAL_SECS";
pub const ENV_NEWS_COUNT: &str = "NEWS_COUNT";
pub const ENV_NEWS_REQUIRE_IMAGE: &str = "NEWS_REQUIRE_IMAGE";
pub const ENV_NEWS_REGION: &str = "NEWS_REGION";
pub const ENV_STRIP_INTERVAL_SECS: &str = "STRIP_INTERVAL_SECS";
pub const ENV_MOVERS_EXCHANGE: &str = "MOVERS_EXCHANGE";
pub const ENV_MOVERS_UNIVERSE: &str = "MOVERS_UNIVERSE";
pub const ENV_MOVERS_TOP: &str = "MOVERS_TOP";

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Without a key the service runs with no upstream (empty cycles).
    pub finnhub_api_key: Option<String>,
    pub finnhub_base_url: String,
    pub refresh_interval_secs: u64,
    pub news_count: usize,
    pub require_image: bool,
    /// "IN" applies the regional keyword filter; anything else keeps the global feed.
    pub region: String,
    pub strip_interval_secs: u64,
    pub movers_exchange: String,
    pub movers_universe: usize,
    pub movers_top: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            finnhub_api_key: None,
            finnhub_base_url: DEFAULT_FINNHUB_BASE_URL.to_string(),
            refresh_interval_secs: 300,
            news_count: 20,
            require_image: true,
            region: "IN".to_string(),
            strip_interval_secs: 30,
            movers_exchange: "NSE".to_string(),
            movers_universe: 50,
            movers_top: 10,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any key lookup; unparsable values fall back to defaults.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let text = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            finnhub_api_key: text(ENV_FINNHUB_API_KEY),
            finnhub_base_url: text(ENV_FINNHUB_BASE_URL)
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(d.finnhub_base_url),
            refresh_interval_secs: parse_positive(text(ENV_REFRESH_INTERVAL_SECS))
                .unwrap_or(d.refresh_interval_secs),
            news_count: parse_positive(text(ENV_NEWS_COUNT))
                .map(|v| v as usize)
                .unwrap_or(d.news_count),
            require_image: text(ENV_NEWS_REQUIRE_IMAGE)
                .map(|v| parse_flag(&v))
                .unwrap_or(d.require_image),
            region: text(ENV_NEWS_REGION)
                .map(|v| v.to_ascii_uppercase())
                .unwrap_or(d.region),
            strip_interval_secs: parse_positive(text(ENV_STRIP_INTERVAL_SECS))
                .unwrap_or(d.strip_interval_secs),
            movers_exchange: text(ENV_MOVERS_EXCHANGE).unwrap_or(d.movers_exchange),
            movers_universe: parse_positive(text(ENV_MOVERS_UNIVERSE))
                .map(|v| v as usize)
                .unwrap_or(d.movers_universe),
            movers_top: parse_positive(text(ENV_MOVERS_TOP))
                .map(|v| v as usize)
                .unwrap_or(d.movers_top),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn strip_interval(&self) -> Duration {
        Duration::from_secs(self.strip_interval_secs)
    }

    pub fn regional(&self) -> bool {
        self.region == "IN"
    }
}

fn parse_positive(raw: Option<String>) -> Option<u64> {
    raw.and_then(|s| s.parse::<u64>().ok()).filter(|v| *v > 0)
}

fn parse_flag(v: &str) -> bool {
    matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = ServiceConfig::from_lookup(|_| None);
        assert_eq!(cfg, ServiceConfig::default());
        assert!(cfg.regional());
    }

    #[test]
    fn overrides_and_bad_values() {
        let cfg = ServiceConfig::from_lookup(lookup(&[
            (ENV_FINNHUB_API_KEY, " abc "),
            (ENV_FINNHUB_BASE_URL, "http://localhost:9000/"),
            (ENV_REFRESH_INTERVAL_SECS, "0"),
            (ENV_NEWS_COUNT, "15"),
            (ENV_NEWS_REQUIRE_IMAGE, "off"),
            (ENV_NEWS_REGION, "us"),
            (ENV_STRIP_INTERVAL_SECS, "nope"),
        ]));
        assert_eq!(cfg.finnhub_api_key.as_deref(), Some("abc"));
        assert_eq!(cfg.finnhub_base_url, "http://localhost:9000");
        assert_eq!(cfg.refresh_interval_secs, 300);
        assert_eq!(cfg.news_count, 15);
        assert!(!cfg.require_image);
        assert_eq!(cfg.region, "US");
        assert!(!cfg.regional());
        assert_eq!(cfg.strip_interval(), Duration::from_secs(30));
    }
}
