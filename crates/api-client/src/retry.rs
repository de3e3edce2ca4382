//! Bounded exponential backoff for provider throttling.
//!
//! [`Backoff`] is a pure state machine: it only counts attempts and computes delays. The
//! [`with_backoff`] driver pairs it with a [`Sleeper`], so tests can replace real sleeping with
//! a recording fake and script the provider's answers.

use crate::error::ApiError;
use async_trait::async_trait;
use configuration::PriceSourceConfig;
use std::future::Future;
use std::time::Duration;

/// How many times to ask, and how long to wait in between.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            multiplier: 2.0,
        }
    }
}

impl From<&PriceSourceConfig> for RetryPolicy {
    fn from(config: &PriceSourceConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay: config.initial_backoff(),
            multiplier: config.backoff_multiplier,
        }
    }
}

/// What to do after a throttled attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait for the given delay, then try again.
    Retry(Duration),
    /// The attempt budget is spent.
    GiveUp,
}

/// Attempt counter and delay schedule for one request.
#[derive(Debug, Clone)]
pub struct Backoff {
    attempts: u32,
    max_attempts: u32,
    next_delay: Duration,
    multiplier: f64,
}

impl Backoff {
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            attempts: 0,
            max_attempts: policy.max_attempts.max(1),
            next_delay: policy.initial_delay,
            multiplier: policy.multiplier,
        }
    }

    /// Records a throttled attempt and decides whether another one is allowed.
    pub fn on_throttled(&mut self) -> RetryDecision {
        self.attempts += 1;
        if self.attempts >= self.max_attempts {
            return RetryDecision::GiveUp;
        }
        let delay = self.next_delay;
        self.next_delay =
            Duration::try_from_secs_f64(self.next_delay.as_secs_f64() * self.multiplier)
                .unwrap_or(Duration::MAX);
        RetryDecision::Retry(delay)
    }

    /// Throttled attempts recorded so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// The result of a single request attempt.
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    Completed(T),
    /// The provider asked us to slow down.
    Throttled,
}

/// Something that can wait. Real code sleeps on the tokio timer.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Runs `attempt` until it completes, fails, or exhausts the policy while throttled.
///
/// Only throttling is retried. Any other error is returned straight away.
pub async fn with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    ticker: &str,
    mut attempt: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<AttemptOutcome<T>, ApiError>>,
{
    let mut backoff = Backoff::new(policy);
    loop {
        match attempt().await? {
            AttemptOutcome::Completed(value) => return Ok(value),
            AttemptOutcome::Throttled => match backoff.on_throttled() {
                RetryDecision::Retry(delay) => {
                    tracing::warn!(
                        ticker,
                        attempt = backoff.attempts(),
                        delay_ms = delay.as_millis() as u64,
                        "Price provider throttled the request, backing off."
                    );
                    sleeper.sleep(delay).await;
                }
                RetryDecision::GiveUp => {
                    return Err(ApiError::RateLimited {
                        ticker: ticker.to_string(),
                        attempts: backoff.attempts(),
                    });
                }
            },
        }
    }
}
