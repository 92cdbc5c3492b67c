//! Environment-driven runtime configuration.

use std::env;

/// Runtime settings, all read from `EXCHANGE_API_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Cache server URL; caching is disabled when unset.
    pub redis_url: Option<String>,
    /// Enables request-level logging.
    pub verbose: bool,
    /// Listen address.
    pub bind: String,
    /// Listen port.
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            redis_url: env_str("EXCHANGE_API_REDIS"),
            verbose: env_str("EXCHANGE_API_VERBOSE")
                .map(|v| parse_bool(&v))
                .unwrap_or(false),
            bind: env_str("EXCHANGE_API_BIND").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env_str("EXCHANGE_API_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        }
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("1"));
        assert!(parse_bool("true"));
        assert!(parse_bool("TRUE"));
        assert!(parse_bool(" yes "));
        assert!(parse_bool("on"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
        assert!(!parse_bool("maybe"));
    }
}
