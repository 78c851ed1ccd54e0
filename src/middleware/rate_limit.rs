//! Per-client rate limiting
//!
//! One token bucket per client IP, refilled at `requests_per_minute` and capped
//! at `burst_size`. Only the `/api` routes are limited.

use crate::config::AppConfig;
use crate::shared::error::{AppError, AppResult};
use crate::shared::logging::LoggingUtils;
use crate::shared::metrics::AppMetrics;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;

/// Buckets tracked before idle ones are dropped
const MAX_TRACKED_CLIENTS: usize = 10_000;

pub struct RateLimitMiddleware {
    limiter: Option<DefaultKeyedRateLimiter<String>>,
    requests_per_minute: u32,
    metrics: AppMetrics,
}

impl RateLimitMiddleware {
    pub fn new(config: &AppConfig, metrics: AppMetrics) -> Self {
        let settings = &config.rate_limit;
        let limiter = settings.enabled.then(|| {
            let per_minute = NonZeroU32::new(settings.requests_per_minute).unwrap_or(NonZeroU32::MIN);
            let burst = NonZeroU32::new(settings.burst_size).unwrap_or(NonZeroU32::MIN);
            RateLimiter::keyed(Quota::per_minute(per_minute).allow_burst(burst))
        });

        Self {
            limiter,
            requests_per_minute: settings.requests_per_minute,
            metrics,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    /// Take one request from the client's bucket
    pub fn check(&self, client_ip: &str) -> AppResult<()> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };

        if limiter.len() > MAX_TRACKED_CLIENTS {
            limiter.retain_recent();
        }

        if limiter.check_key(&client_ip.to_string()).is_err() {
            LoggingUtils::log_rate_limit(client_ip, self.requests_per_minute);
            self.metrics.record_rate_limited();
            return Err(AppError::RateLimit);
        }
        Ok(())
    }
}
