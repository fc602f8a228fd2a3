//! Rate limiting for abuse-prone endpoints

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::info;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Requests allowed per window
    pub max_attempts: u32,
    /// Window length
    pub window: Duration,
    /// How long a client stays blocked after exceeding the limit
    pub ban: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::from_secs(60),
            ban: Duration::from_secs(600),
        }
    }
}

#[derive(Debug)]
struct ClientEntry {
    attempts: u32,
    window_started: Instant,
    banned_until: Option<Instant>,
}

/// Fixed-window rate limiter keyed by client address
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    clients: Arc<Mutex<HashMap<String, ClientEntry>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record an attempt by `key` and tell whether it may proceed
    pub async fn is_allowed(&self, key: &str) -> bool {
        let mut clients = self.clients.lock().await;
        let now = Instant::now();

        let entry = clients.entry(key.to_string()).or_insert(ClientEntry {
            attempts: 0,
            window_started: now,
            banned_until: None,
        });

        if let Some(banned_until) = entry.banned_until {
            if now < banned_until {
                return false;
            }
            entry.banned_until = None;
            entry.attempts = 0;
            entry.window_started = now;
        }

        if now.duration_since(entry.window_started) >= self.config.window {
            entry.attempts = 0;
            entry.window_started = now;
        }

        if entry.attempts >= self.config.max_attempts {
            entry.banned_until = Some(now + self.config.ban);
            info!("Rate limited {} for {:?}", key, self.config.ban);
            return false;
        }

        entry.attempts += 1;
        true
    }
}
