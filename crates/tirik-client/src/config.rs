//! # Client Configuration
//!
//! Transport settings for the Tirikchilik client.
//! Defaults match the upstream integration; every value can be overridden
//! from the environment or with the `with_*` builders.

use std::env;
use std::time::Duration;
use tirik_core::{PaymentError, PaymentResult};

/// Production API host
pub const DEFAULT_BASE_URL: &str = "https://api.tirikchilik.uz";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(3050);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(100);
/// Upper bound for any single retry delay
pub const MAX_BACKOFF: Duration = Duration::from_secs(120);
pub const DEFAULT_POOL_SIZE: usize = 10;
/// Statuses that trigger a retry of idempotent requests
pub const RETRY_STATUSES: [u16; 4] = [500, 502, 503, 504];
/// Statuses whose `Retry-After` header replaces the computed backoff
pub const RETRY_AFTER_STATUSES: [u16; 3] = [413, 429, 503];

/// Retry settings applied by the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent one
    pub backoff: Duration,
    pub max_backoff: Duration,
    pub statuses: Vec<u16>,
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.backoff.saturating_mul(factor).min(self.max_backoff)
    }

    /// Delay before retry number `retry` after `status`.
    ///
    /// `retry_after` only counts for 413/429/503 and is capped at
    /// `max_backoff`; every other status uses the doubling backoff.
    pub fn delay_for_status(
        &self,
        status: u16,
        retry_after: Option<Duration>,
        retry: u32,
    ) -> Duration {
        match retry_after {
            Some(delay) if RETRY_AFTER_STATUSES.contains(&status) => delay.min(self.max_backoff),
            _ => self.delay_for(retry),
        }
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.statuses.contains(&status)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: DEFAULT_BACKOFF,
            max_backoff: MAX_BACKOFF,
            statuses: RETRY_STATUSES.to_vec(),
        }
    }
}

/// Tirikchilik client configuration
#[derive(Debug, Clone)]
pub struct TirikConfig {
    /// API base URL (override for testing/mocking)
    pub base_url: String,

    pub connect_timeout: Duration,

    pub read_timeout: Duration,

    /// Idle pooled connections kept per host
    pub pool_size: usize,

    pub retry: RetryPolicy,
}

impl TirikConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional env vars (defaults in parentheses):
    /// - `TIRIK_BASE_URL` (`https://api.tirikchilik.uz`)
    /// - `TIRIK_CONNECT_TIMEOUT_MS` (3050)
    /// - `TIRIK_READ_TIMEOUT_MS` (10000)
    /// - `TIRIK_MAX_RETRIES` (3)
    /// - `TIRIK_BACKOFF_MS` (100)
    /// - `TIRIK_POOL_SIZE` (10)
    pub fn from_env() -> PaymentResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let mut config = Self::default();

        if let Ok(url) = env::var("TIRIK_BASE_URL") {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(PaymentError::Configuration(
                    "TIRIK_BASE_URL must start with http:// or https://".to_string(),
                ));
            }
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ms) = parse_var::<u64>("TIRIK_CONNECT_TIMEOUT_MS")? {
            config.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>("TIRIK_READ_TIMEOUT_MS")? {
            config.read_timeout = Duration::from_millis(ms);
        }
        if let Some(n) = parse_var::<u32>("TIRIK_MAX_RETRIES")? {
            config.retry.max_retries = n;
        }
        if let Some(ms) = parse_var::<u64>("TIRIK_BACKOFF_MS")? {
            config.retry.backoff = Duration::from_millis(ms);
        }
        if let Some(n) = parse_var::<usize>("TIRIK_POOL_SIZE")? {
            config.pool_size = n;
        }

        Ok(config)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder: set connect and read timeouts
    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    /// Builder: replace the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// `<base>/api/User/GetByName`
    pub fn user_lookup_url(&self) -> String {
        format!("{}/api/User/GetByName", self.base_url)
    }

    /// `<base>/api/ProjectPay/Create`
    pub fn create_payment_url(&self) -> String {
        format!("{}/api/ProjectPay/Create", self.base_url)
    }

    /// `<base>/api/ProjectPay/Status`
    pub fn payment_status_url(&self) -> String {
        format!("{}/api/ProjectPay/Status", self.base_url)
    }
}

impl Default for TirikConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            pool_size: DEFAULT_POOL_SIZE,
            retry: RetryPolicy::default(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> PaymentResult<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| {
                PaymentError::Configuration(format!("{} is not a valid number: {:?}", name, raw))
            }),
        Err(_) => Ok(None),
    }
}
