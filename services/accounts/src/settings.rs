//! Service configuration
//!
//! Settings come from three layers, each overriding the one before:
//! built-in defaults, an optional `accounts.toml` next to the binary,
//! and `ACCOUNTS__`-prefixed environment variables (for example
//! `ACCOUNTS__HTTP__BIND_ADDR`).

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::rate_limiter::RateLimiterConfig;

/// Seconds a session stays alive without being refreshed: 30 days
const DEFAULT_SESSION_TTL: i64 = 2_592_000;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub http: HttpSettings,
    pub rpc: RpcSettings,
    pub session: SessionSettings,
    pub cors: CorsSettings,
    pub rate_limit: RateLimitSettings,
}

/// Public HTTP listener
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    pub bind_addr: String,
}

/// Internal RPC listener used by the other services
#[derive(Debug, Clone, Deserialize)]
pub struct RpcSettings {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Origin allowed to call the public API with credentials
    pub allowed_origin: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    pub max_attempts: u32,
    pub window_seconds: u64,
    pub ban_seconds: u64,
}

impl RateLimitSettings {
    /// Convert into the limiter's runtime configuration
    pub fn to_config(&self) -> RateLimiterConfig {
        RateLimiterConfig {
            max_attempts: self.max_attempts,
            window: Duration::from_secs(self.window_seconds),
            ban: Duration::from_secs(self.ban_seconds),
        }
    }
}

impl Settings {
    /// Load settings from defaults, the optional config file and the
    /// environment
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("http.bind_addr", "0.0.0.0:8080")?
            .set_default("rpc.bind_addr", "0.0.0.0:8081")?
            .set_default("session.ttl_seconds", DEFAULT_SESSION_TTL)?
            .set_default("cors.allowed_origin", "http://localhost:3000")?
            .set_default("rate_limit.max_attempts", 5_i64)?
            .set_default("rate_limit.window_seconds", 60_i64)?
            .set_default("rate_limit.ban_seconds", 600_i64)?
            .add_source(File::with_name("accounts").required(false))
            .add_source(Environment::with_prefix("ACCOUNTS").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_settings_defaults() {
        unsafe {
            std::env::remove_var("ACCOUNTS__HTTP__BIND_ADDR");
            std::env::remove_var("ACCOUNTS__RPC__BIND_ADDR");
            std::env::remove_var("ACCOUNTS__SESSION__TTL_SECONDS");
            std::env::remove_var("ACCOUNTS__CORS__ALLOWED_ORIGIN");
        }

        let settings = Settings::load().expect("Failed to load settings");
        assert_eq!(settings.http.bind_addr, "0.0.0.0:8080");
        assert_eq!(settings.rpc.bind_addr, "0.0.0.0:8081");
        assert_eq!(settings.session.ttl_seconds, 2_592_000);
        assert_eq!(settings.cors.allowed_origin, "http://localhost:3000");
        assert_eq!(settings.rate_limit.max_attempts, 5);
    }

    #[test]
    #[serial]
    fn test_settings_from_env() {
        unsafe {
            std::env::set_var("ACCOUNTS__HTTP__BIND_ADDR", "127.0.0.1:9090");
            std::env::set_var("ACCOUNTS__SESSION__TTL_SECONDS", "120");
            std::env::set_var("ACCOUNTS__CORS__ALLOWED_ORIGIN", "https://arena.example");
        }

        let settings = Settings::load().expect("Failed to load settings");
        assert_eq!(settings.http.bind_addr, "127.0.0.1:9090");
        assert_eq!(settings.session.ttl_seconds, 120);
        assert_eq!(settings.cors.allowed_origin, "https://arena.example");
        // Untouched sections keep their defaults
        assert_eq!(settings.rpc.bind_addr, "0.0.0.0:8081");

        unsafe {
            std::env::remove_var("ACCOUNTS__HTTP__BIND_ADDR");
            std::env::remove_var("ACCOUNTS__SESSION__TTL_SECONDS");
            std::env::remove_var("ACCOUNTS__CORS__ALLOWED_ORIGIN");
        }
    }

    #[test]
    fn test_rate_limit_conversion() {
        let settings = RateLimitSettings {
            max_attempts: 3,
            window_seconds: 10,
            ban_seconds: 20,
        };

        let config = settings.to_config();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.window, Duration::from_secs(10));
        assert_eq!(config.ban, Duration::from_secs(20));
    }
}
