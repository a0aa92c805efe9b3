//! Rate limiting configuration.

use crate::ratelimit::{RateLimitCategory, RateLimitError};

/// Configuration for the rate limiting system.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enabled
    pub enabled: bool,
    /// Prefix for store keys (e.g., "outreach:rl")
    pub key_prefix: String,
    /// Whether to trust X-Forwarded-For headers
    pub trust_proxy: bool,
    /// Per-policy rate limits
    pub limits: RateLimits,
}

/// Rate limits for each predefined policy.
#[derive(Debug, Clone)]
pub struct RateLimits {
    /// AI text generation
    pub ai_generation: LimitConfig,
    /// Checkout session creation
    pub checkout: LimitConfig,
    /// General API traffic
    pub api: LimitConfig,
}

/// Configuration for a single rate limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitConfig {
    /// Limit name (also part of the record key, after normalization)
    pub name: String,
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Window duration in milliseconds
    pub window_ms: u64,
}

impl LimitConfig {
    /// Creates a validated limit configuration.
    pub fn new(
        name: impl Into<String>,
        max_requests: u32,
        window_ms: u64,
    ) -> Result<Self, RateLimitError> {
        let config = Self {
            name: name.into(),
            max_requests,
            window_ms,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants `max_requests >= 1`, `window_ms > 0` and a
    /// non-blank name.
    pub fn validate(&self) -> Result<(), RateLimitError> {
        if self.name.trim().is_empty() {
            return Err(RateLimitError::InvalidConfig("limit name is empty".into()));
        }
        if self.max_requests == 0 {
            return Err(RateLimitError::InvalidConfig(format!(
                "{}: max_requests must be at least 1",
                self.name
            )));
        }
        if self.window_ms == 0 || i64::try_from(self.window_ms).is_err() {
            return Err(RateLimitError::InvalidConfig(format!(
                "{}: window_ms must be positive",
                self.name
            )));
        }
        Ok(())
    }

    /// Window length as signed milliseconds, for timestamp arithmetic.
    pub(crate) fn window_ms_i64(&self) -> i64 {
        i64::try_from(self.window_ms).unwrap_or(i64::MAX)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            key_prefix: "outreach:rl".to_string(),
            trust_proxy: false,
            limits: RateLimits::default(),
        }
    }
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            ai_generation: LimitConfig {
                name: "AI Generation".to_string(),
                max_requests: 5,
                window_ms: 60 * 60 * 1000,
            },
            checkout: LimitConfig {
                name: "Checkout".to_string(),
                max_requests: 10,
                window_ms: 60 * 60 * 1000,
            },
            api: LimitConfig {
                name: "General API".to_string(),
                max_requests: 60,
                window_ms: 60 * 1000,
            },
        }
    }
}

impl RateLimits {
    /// Returns the limit configuration for a given category.
    pub const fn get(&self, category: RateLimitCategory) -> &LimitConfig {
        match category {
            RateLimitCategory::AiGeneration => &self.ai_generation,
            RateLimitCategory::Checkout => &self.checkout,
            RateLimitCategory::Api => &self.api,
        }
    }
}

impl RateLimitConfig {
    /// Creates configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RATE_LIMIT_ENABLED`: Enable/disable rate limiting (default: true)
    /// - `RATE_LIMIT_PREFIX`: Store key prefix (default: "outreach:rl")
    /// - `RATE_LIMIT_TRUST_PROXY`: Trust X-Forwarded-For headers (default: false)
    /// - `RATE_LIMIT_AI_GENERATION`: AI generation limit as "requests,window_secs"
    /// - `RATE_LIMIT_CHECKOUT`: Checkout limit as "requests,window_secs"
    /// - `RATE_LIMIT_API`: General API limit as "requests,window_secs"
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RATE_LIMIT_ENABLED") {
            config.enabled = val.parse().unwrap_or(true);
        }
        if let Ok(val) = std::env::var("RATE_LIMIT_PREFIX") {
            config.key_prefix = val;
        }
        if let Ok(val) = std::env::var("RATE_LIMIT_TRUST_PROXY") {
            config.trust_proxy = val.parse().unwrap_or(false);
        }

        let overrides = [
            ("RATE_LIMIT_AI_GENERATION", &mut config.limits.ai_generation),
            ("RATE_LIMIT_CHECKOUT", &mut config.limits.checkout),
            ("RATE_LIMIT_API", &mut config.limits.api),
        ];
        for (var, limit) in overrides {
            if let Ok(val) = std::env::var(var) {
                if let Some((max_requests, window_ms)) = parse_limit_config(&val) {
                    limit.max_requests = max_requests;
                    limit.window_ms = window_ms;
                }
            }
        }

        config
    }
}

/// Parses "requests,window_secs" into `(max_requests, window_ms)`.
///
/// Zero values are rejected so an override can never produce an invalid limit.
fn parse_limit_config(val: &str) -> Option<(u32, u64)> {
    let parts: Vec<&str> = val.split(',').collect();
    if parts.len() == 2 {
        let requests: u32 = parts[0].trim().parse().ok()?;
        let window_secs: u64 = parts[1].trim().parse().ok()?;
        if requests == 0 || window_secs == 0 {
            return None;
        }
        Some((requests, window_secs.checked_mul(1000)?))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.key_prefix, "outreach:rl");
        assert!(!config.trust_proxy);
    }

    #[test]
    fn test_default_limits() {
        let limits = RateLimits::default();
        assert_eq!(limits.ai_generation.max_requests, 5);
        assert_eq!(limits.ai_generation.window_ms, 3_600_000);
        assert_eq!(limits.checkout.max_requests, 10);
        assert_eq!(limits.checkout.window_ms, 3_600_000);
        assert_eq!(limits.api.max_requests, 60);
        assert_eq!(limits.api.window_ms, 60_000);

        for category in RateLimitCategory::all() {
            assert!(limits.get(*category).validate().is_ok());
        }
    }

    #[test]
    fn test_limit_config_validation() {
        assert!(LimitConfig::new("api", 1, 1).is_ok());
        assert!(matches!(
            LimitConfig::new("api", 0, 1000),
            Err(RateLimitError::InvalidConfig(_))
        ));
        assert!(matches!(
            LimitConfig::new("api", 5, 0),
            Err(RateLimitError::InvalidConfig(_))
        ));
        assert!(matches!(
            LimitConfig::new("   ", 5, 1000),
            Err(RateLimitError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_parse_limit_config() {
        assert_eq!(parse_limit_config("10,60"), Some((10, 60_000)));

        // With whitespace
        assert_eq!(parse_limit_config(" 20 , 120 "), Some((20, 120_000)));

        // Invalid formats
        assert!(parse_limit_config("10").is_none());
        assert!(parse_limit_config("10,60,extra").is_none());
        assert!(parse_limit_config("abc,60").is_none());
        assert!(parse_limit_config("0,60").is_none());
        assert!(parse_limit_config("5,0").is_none());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        std::env::set_var("RATE_LIMIT_PREFIX", "test:prefix");
        std::env::set_var("RATE_LIMIT_AI_GENERATION", "2,30");
        std::env::set_var("RATE_LIMIT_API", "garbage");

        let config = RateLimitConfig::from_env();

        std::env::remove_var("RATE_LIMIT_PREFIX");
        std::env::remove_var("RATE_LIMIT_AI_GENERATION");
        std::env::remove_var("RATE_LIMIT_API");

        assert_eq!(config.key_prefix, "test:prefix");
        assert_eq!(config.limits.ai_generation.max_requests, 2);
        assert_eq!(config.limits.ai_generation.window_ms, 30_000);
        assert_eq!(config.limits.ai_generation.name, "AI Generation");
        // Malformed override keeps the default
        assert_eq!(config.limits.api, RateLimits::default().api);
    }
}
